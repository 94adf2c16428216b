use std::sync::Arc;

use anyhow::Context;
use autodb_service::{CarService, CarStore, ServiceResult};
use autodb_store::JsonFileCarStore;
use autodb_types::{Car, CarId, HistoryEntry, IdentityMaterial, Principal};
use colored::Colorize;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

/// Result of one command, before rendering.
#[derive(Debug)]
pub enum Output {
    Car(Car),
    Cars(Vec<Car>),
    History(Vec<HistoryEntry>),
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let caller = resolve_caller(&cli)?;
    let config = CliConfig::load(cli.config.as_deref())?;
    let store_path = cli.store.unwrap_or(config.store_path);
    let store = JsonFileCarStore::open(&store_path)
        .with_context(|| format!("opening store {}", store_path.display()))?;
    let service = CarService::new(Arc::new(store), config.service);

    debug!(store = %store_path.display(), caller = %caller, "running command");

    let output = execute(&service, &caller, cli.command)?;
    println!("{}", render(&output, cli.format)?);
    Ok(())
}

/// Dispatch one command to the service.
pub fn execute<S: CarStore>(
    service: &CarService<S>,
    caller: &Principal,
    command: Command,
) -> ServiceResult<Output> {
    let output = match command {
        Command::Create(args) => Output::Car(service.create(caller, args.into_payload())?),
        Command::Get { id } => Output::Car(service.get_by_id(&CarId::from(id))?),
        Command::GetByName { name } => Output::Car(service.get_by_name(&name)?),
        Command::List => Output::Cars(service.list_all()?),
        Command::Update { id, payload } => {
            Output::Car(service.update(caller, &CarId::from(id), payload.into_payload())?)
        }
        Command::Delete { id } => Output::Car(service.delete(caller, &CarId::from(id))?),
        Command::SearchCompany { company } => {
            Output::Cars(service.search_by_company_name(&company)?)
        }
        Command::SearchModel { model } => Output::Cars(service.search_by_model(&model)?),
        Command::ByOwner { owner } => {
            Output::Cars(service.get_cars_by_owner(&resolve_principal(&owner))?)
        }
        Command::PriceRange { min, max } => {
            Output::Cars(service.filter_by_price_range(&min, &max)?)
        }
        Command::ByPrice { price } => Output::Car(service.get_by_price(&price)?),
        Command::Newest => Output::Car(service.get_newest_car()?),
        Command::Oldest => Output::Car(service.get_oldest_car()?),
        Command::Recommend(args) => Output::Cars(service.recommend(&args.into_preferences())?),
        Command::History { id } => Output::History(service.get_history(&CarId::from(id))?),
        Command::SetOwner { id, owner } => Output::Car(service.update_owner(
            caller,
            &CarId::from(id),
            &resolve_principal(&owner),
        )?),
        Command::SetImage { id, image } => {
            Output::Car(service.update_image(caller, &CarId::from(id), &image)?)
        }
    };
    Ok(output)
}

/// The acting principal: `--caller-key` when given, else `--caller`.
pub fn resolve_caller(cli: &Cli) -> anyhow::Result<Principal> {
    match &cli.caller_key {
        Some(key) => {
            let material = IdentityMaterial::public_key_from_hex(key.trim())
                .context("invalid --caller-key")?;
            Ok(Principal::derive(&material))
        }
        None => Ok(resolve_principal(&cli.caller)),
    }
}

/// Map a `--caller`/owner argument to a principal.
///
/// `anonymous` (or blank) is the anonymous principal, `name:<n>` is always
/// the name `n`, 64 hex characters (optionally `pr:`-prefixed) are taken
/// verbatim, anything else is a name.
pub fn resolve_principal(raw: &str) -> Principal {
    let raw = raw.trim();
    if raw.is_empty() || raw == "anonymous" {
        return Principal::anonymous();
    }
    if let Some(name) = raw.strip_prefix("name:") {
        return Principal::from_name(name);
    }
    Principal::from_hex(raw).unwrap_or_else(|_| Principal::from_name(raw))
}

pub fn render(output: &Output, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let json = match output {
                Output::Car(car) => serde_json::to_string_pretty(car)?,
                Output::Cars(cars) => serde_json::to_string_pretty(cars)?,
                Output::History(entries) => serde_json::to_string_pretty(entries)?,
            };
            Ok(json)
        }
        OutputFormat::Text => Ok(render_text(output)),
    }
}

fn render_text(output: &Output) -> String {
    match output {
        Output::Car(car) => render_car(car),
        Output::Cars(cars) if cars.is_empty() => "No cars.".to_string(),
        Output::Cars(cars) => {
            let mut out = format!("{} car(s)", cars.len().to_string().bold());
            for car in cars {
                out.push_str("\n\n");
                out.push_str(&render_car(car));
            }
            out
        }
        Output::History(entries) => entries
            .iter()
            .map(|e| {
                format!(
                    "Owner: {}  Created: {}  Updated: {}",
                    e.owner.to_string().cyan(),
                    e.created_at,
                    render_updated(e.updated_at.as_ref()),
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_car(car: &Car) -> String {
    [
        format!("{} {}", car.name.bold(), format!("({})", car.id).yellow()),
        format!("  Model:     {}", car.model),
        format!("  Company:   {}", car.company_name.cyan()),
        format!("  Engine:    {} cc", car.cubic_capacity_of_engine),
        format!("  Price:     {}", car.price.to_string().green()),
        format!("  Top speed: {} km/h", car.top_speed),
        format!("  Image:     {}", car.image),
        format!("  Owner:     {}", car.owner),
        format!("  Created:   {}", car.created_at),
        format!("  Updated:   {}", render_updated(car.updated_at.as_ref())),
    ]
    .join("\n")
}

fn render_updated(at: Option<&autodb_types::Timestamp>) -> String {
    at.map(ToString::to_string)
        .unwrap_or_else(|| "never".dimmed().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autodb_service::{ErrorKind, InMemoryCarStore, ServiceConfig};
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["autodb"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn service() -> CarService<InMemoryCarStore> {
        CarService::new(Arc::new(InMemoryCarStore::new()), ServiceConfig::default())
    }

    fn create_model_x(svc: &CarService<InMemoryCarStore>, caller: &str) -> Car {
        let cli = parse(&[
            "create", "--name", "Model X", "--model", "X", "--cc", "0", "--price", "80000",
            "--top-speed", "250", "--company", "Tesla", "--image", "x.png",
        ]);
        match execute(svc, &resolve_principal(caller), cli.command).unwrap() {
            Output::Car(car) => car,
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[test]
    fn principal_resolution() {
        assert!(resolve_principal("anonymous").is_anonymous());
        assert!(resolve_principal("  ").is_anonymous());
        assert_eq!(resolve_principal("alice"), Principal::from_name("alice"));

        let p = Principal::from_name("bob");
        assert_eq!(resolve_principal(&p.to_hex()), p);
        assert_eq!(resolve_principal(&format!("pr:{}", p.to_hex())), p);
    }

    #[test]
    fn name_prefix_forces_name_for_hex_looking_callers() {
        let hexish = "ab".repeat(32);
        assert_ne!(resolve_principal(&hexish), Principal::from_name(&hexish));
        assert_eq!(
            resolve_principal(&format!("name:{hexish}")),
            Principal::from_name(&hexish)
        );
        assert_eq!(resolve_principal("name:alice"), Principal::from_name("alice"));
    }

    #[test]
    fn caller_key_derives_from_public_key() {
        let key = "cd".repeat(32);
        let cli = parse(&["list", "--caller-key", key.as_str()]);
        let caller = resolve_caller(&cli).unwrap();
        assert_eq!(caller, Principal::derive(&IdentityMaterial::PublicKey([0xcd; 32])));
        assert_ne!(caller, resolve_principal(&key));

        assert!(resolve_caller(&parse(&["list", "--caller-key", "zz"])).is_err());
        assert!(Cli::try_parse_from(["autodb", "list", "--caller", "a", "--caller-key", key.as_str()])
            .is_err());
        assert_eq!(resolve_caller(&parse(&["list"])).unwrap(), Principal::anonymous());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = parse(&["list", "--caller", "alice", "--format", "json", "--store", "s.json"]);
        assert_eq!(cli.caller, "alice");
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.store.unwrap().to_str(), Some("s.json"));
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn create_requires_payload_flags() {
        assert!(Cli::try_parse_from(["autodb", "create", "--name", "x"]).is_err());
    }

    #[test]
    fn scenario_through_commands() {
        let svc = service();
        let car = create_model_x(&svc, "alice");
        assert_eq!(car.owner, Principal::from_name("alice"));

        let found = execute(&svc, &Principal::anonymous(), parse(&["get-by-name", "model x"]).command)
            .unwrap();
        assert!(matches!(found, Output::Car(ref c) if c.id == car.id));

        execute(
            &svc,
            &resolve_principal("alice"),
            parse(&["set-owner", car.id.as_str(), "bob"]).command,
        )
        .unwrap();

        let err = execute(
            &svc,
            &resolve_principal("alice"),
            parse(&["delete", car.id.as_str()]).command,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        execute(
            &svc,
            &resolve_principal("bob"),
            parse(&["delete", car.id.as_str()]).command,
        )
        .unwrap();
        assert!(svc.list_all().unwrap().is_empty());
    }

    #[test]
    fn queries_dispatch() {
        let svc = service();
        create_model_x(&svc, "alice");
        let anon = Principal::anonymous();

        let cases: Vec<(Vec<&str>, usize)> = vec![
            (vec!["search-company", "TESLA"], 1),
            (vec!["search-model", "x"], 1),
            (vec!["by-owner", "alice"], 1),
            (vec!["by-owner", "bob"], 0),
            (vec!["price-range", "0", "100000"], 1),
            (vec!["price-range", "90000", "100000"], 0),
            (vec!["recommend", "--max-price", "10"], 1),
        ];
        for (args, expected) in cases {
            match execute(&svc, &anon, parse(&args).command).unwrap() {
                Output::Cars(cars) => assert_eq!(cars.len(), expected, "{args:?}"),
                other => panic!("unexpected output {other:?}"),
            }
        }

        assert!(matches!(
            execute(&svc, &anon, parse(&["by-price", "80000"]).command).unwrap(),
            Output::Car(_)
        ));
        assert!(matches!(
            execute(&svc, &anon, parse(&["newest"]).command).unwrap(),
            Output::Car(_)
        ));
        let err = execute(&svc, &anon, parse(&["price-range", "a", "b"]).command).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn json_rendering_uses_record_shape() {
        let svc = service();
        let car = create_model_x(&svc, "alice");
        let json = render(&Output::Car(car.clone()), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["id"], car.id.as_str());
        assert_eq!(value["companyName"], "Tesla");

        let history = render(
            &Output::History(vec![car.history_entry()]),
            OutputFormat::Json,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&history).unwrap();
        assert!(value[0]["updatedAt"].is_null());
    }

    #[test]
    fn text_rendering() {
        colored::control::set_override(false);
        let svc = service();
        let car = create_model_x(&svc, "alice");

        let text = render(&Output::Car(car.clone()), OutputFormat::Text).unwrap();
        assert!(text.contains("Model X"));
        assert!(text.contains("Tesla"));
        assert!(text.contains("never"));

        let empty = render(&Output::Cars(vec![]), OutputFormat::Text).unwrap();
        assert_eq!(empty, "No cars.");

        let list = render(&Output::Cars(vec![car]), OutputFormat::Text).unwrap();
        assert!(list.starts_with("1 car(s)"));
    }

    #[test]
    fn run_command_persists_between_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("cars.json");
        let store_arg = store.to_str().unwrap();

        run_command(parse(&[
            "--store", store_arg, "--caller", "alice", "create", "--name", "Golf", "--model",
            "Mk8", "--cc", "1498", "--price", "30000", "--top-speed", "224", "--company",
            "Volkswagen", "--image", "golf.png",
        ]))
        .unwrap();
        run_command(parse(&["--store", store_arg, "get-by-name", "golf"])).unwrap();

        let reopened = JsonFileCarStore::open(&store).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
        assert!(run_command(parse(&["--store", store_arg, "get-by-name", "polo"])).is_err());
    }
}
