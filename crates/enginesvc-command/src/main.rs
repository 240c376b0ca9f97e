use clap::{ArgGroup, Args, Parser, Subcommand};
use enginesvc_client::{EngineClient, Instancer};
use enginesvc_core::{Engine, EngineService, LoggingLayer};
use tower::ServiceBuilder;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "enginectl")]
#[command(about = "Register and look up engines across enginesvc instances", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["discovery", "instances"])))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the discovery registry
    #[arg(long, env = "ENGINESVC_DISCOVERY")]
    discovery: Option<String>,

    /// Fixed instance addresses, bypassing discovery
    #[arg(long, env = "ENGINESVC_INSTANCES", value_delimiter = ',')]
    instances: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new engine
    Register(RegisterArgs),
    /// Show a registered engine
    Get {
        /// Engine id
        id: String,
    },
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    id: String,
    #[arg(long, default_value = "")]
    factory_id: String,
    #[arg(long, default_value = "")]
    engine_config: String,
    #[arg(long, default_value_t = 0.0)]
    engine_capacity: f64,
    #[arg(long, default_value_t = 0.0)]
    fuel_capacity: f64,
    #[arg(long, default_value_t = 0.0)]
    fuel_range: f64,
    #[arg(long, default_value_t = 0.0)]
    engine_hp: f64,
    #[arg(long, default_value_t = 0.0)]
    engine_torque: f64,
}

impl From<RegisterArgs> for Engine {
    fn from(args: RegisterArgs) -> Self {
        Engine {
            id: args.id,
            factory_id: args.factory_id,
            engine_config: args.engine_config,
            engine_capacity: args.engine_capacity,
            fuel_capacity: args.fuel_capacity,
            fuel_range: args.fuel_range,
            engine_hp: args.engine_hp,
            engine_torque: args.engine_torque,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = if !cli.instances.is_empty() {
        EngineClient::from_instancer(Instancer::fixed(cli.instances))
    } else if let Some(addr) = cli.discovery.as_deref() {
        EngineClient::connect(addr).await?
    } else {
        return Err("either --discovery or --instances is required".into());
    };
    let client = ServiceBuilder::new()
        .layer(LoggingLayer::new("enginectl"))
        .service(client);

    match cli.command {
        Commands::Register(args) => {
            let engine = Engine::from(args);
            let id = engine.id.clone();
            client.register(engine).await?;
            println!("Engine registered: {}", id);
        }
        Commands::Get { id } => {
            let engine = client.get_engine(&id).await?;
            println!("{}", serde_json::to_string_pretty(&engine)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_args_build_engine() {
        let cli = Cli::try_parse_from([
            "enginectl",
            "--instances",
            "127.0.0.1:8080,127.0.0.1:8081",
            "register",
            "--id",
            "e1",
            "--factory-id",
            "f1",
            "--engine-hp",
            "250.5",
        ])
        .unwrap();

        assert_eq!(cli.instances, vec!["127.0.0.1:8080", "127.0.0.1:8081"]);
        let Commands::Register(args) = cli.command else {
            panic!("expected register");
        };
        let engine = Engine::from(args);
        assert_eq!(engine.id, "e1");
        assert_eq!(engine.factory_id, "f1");
        assert_eq!(engine.engine_hp, 250.5);
        assert_eq!(engine.fuel_range, 0.0);
    }

    #[test]
    fn get_takes_positional_id() {
        let cli = Cli::try_parse_from(["enginectl", "--discovery", "http://127.0.0.1:3000", "get", "e9"])
            .unwrap();
        assert_eq!(cli.discovery.as_deref(), Some("http://127.0.0.1:3000"));
        assert!(matches!(cli.command, Commands::Get { id } if id == "e9"));
    }

    #[test]
    fn an_instance_source_is_required() {
        assert!(Cli::try_parse_from(["enginectl", "get", "e1"]).is_err());
    }
}
