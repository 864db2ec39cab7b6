//! Pet command handlers.

use simpleapi_core::{Coordinator, Headers, Params, Persist, RequestSpec};

use crate::cli::{FetchArgs, GlobalOpts, PetsArgs, PetsCommand};
use crate::error::CliError;
use crate::model::{Pet, PetRow};
use crate::output;

pub async fn handle(
    coordinator: &Coordinator,
    args: PetsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PetsCommand::Fetch(fetch) => {
            let url = fetch.url.clone();
            let one = fetch.one;
            let spec = build_spec(fetch);

            let pets = if one {
                vec![
                    coordinator
                        .fetch_one::<Pet>(spec)
                        .await
                        .map_err(|e| CliError::from_api(e, &url))?,
                ]
            } else {
                coordinator
                    .fetch_many::<Pet>(spec)
                    .await
                    .map_err(|e| CliError::from_api(e, &url))?
            };

            print_pets(&pets, global)
        }

        PetsCommand::List => {
            let pets: Vec<Pet> = coordinator.records().load_all().await?;
            print_pets(&pets, global)
        }

        PetsCommand::Clear => {
            let removed = coordinator.records().clear::<Pet>().await?;
            if !global.quiet {
                eprintln!("Removed {removed} stored pet(s)");
            }
            Ok(())
        }
    }
}

fn build_spec(args: FetchArgs) -> RequestSpec {
    let mut spec = RequestSpec::new(args.url);
    spec.method = args.method;
    spec.encoding = args.encoding;

    if !args.params.is_empty() {
        let params: Params = args
            .params
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        spec = spec.params(params);
    }
    if !args.headers.is_empty() {
        spec = spec.headers(args.headers.into_iter().collect::<Headers>());
    }

    spec.persist(match (args.persist, args.no_persist) {
        (true, _) => Persist::Always,
        (_, true) => Persist::Never,
        _ => Persist::Default,
    })
}

fn print_pets(pets: &[Pet], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(global.output, pets, |p| PetRow::from(p), |p| p.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simpleapi_core::{Method, ParamsEncoding};

    fn fetch_args() -> FetchArgs {
        FetchArgs {
            url: "http://pets.test/pets".into(),
            one: false,
            method: None,
            encoding: None,
            params: Vec::new(),
            headers: Vec::new(),
            persist: false,
            no_persist: false,
        }
    }

    #[test]
    fn unset_flags_leave_defaults_in_charge() {
        let spec = build_spec(fetch_args());
        assert_eq!(spec.method, None);
        assert_eq!(spec.encoding, None);
        assert_eq!(spec.params, None);
        assert_eq!(spec.headers, None);
        assert_eq!(spec.persist, Persist::Default);
    }

    #[test]
    fn flags_fill_the_spec() {
        let spec = build_spec(FetchArgs {
            method: Some(Method::Post),
            encoding: Some(ParamsEncoding::Json),
            params: vec![("type".into(), "dog".into())],
            headers: vec![("token".into(), "abc".into())],
            no_persist: true,
            ..fetch_args()
        });

        assert_eq!(spec.method, Some(Method::Post));
        assert_eq!(spec.encoding, Some(ParamsEncoding::Json));
        assert_eq!(
            spec.params.and_then(|p| p.get("type").cloned()),
            Some(serde_json::json!("dog"))
        );
        assert_eq!(
            spec.headers.and_then(|h| h.get("token").cloned()),
            Some("abc".to_string())
        );
        assert_eq!(spec.persist, Persist::Never);
    }
}
