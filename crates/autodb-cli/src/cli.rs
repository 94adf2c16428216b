use std::path::PathBuf;

use autodb_types::{CarPayload, Preferences};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "autodb",
    about = "AutoDB: car record store and query engine",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// JSON store file (overrides `store_path` from the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Identity of the caller: `anonymous`, a name, or a principal as 64 hex
    /// characters (optionally `pr:`-prefixed). A value that parses as a
    /// principal is taken as one; prefix with `name:` to force a name.
    #[arg(long, global = true, default_value = "anonymous")]
    pub caller: String,

    /// Caller public key (64 hex characters); the principal is derived from it
    #[arg(long, global = true, conflicts_with = "caller")]
    pub caller_key: Option<String>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a car owned by the caller
    Create(PayloadArgs),
    /// Show a car by id
    Get { id: String },
    /// Show the first car with this name (case-insensitive)
    GetByName { name: String },
    /// List every car in key order
    List,
    /// Replace the descriptive fields of a car
    Update {
        id: String,
        #[command(flatten)]
        payload: PayloadArgs,
    },
    /// Delete a car (owner only)
    Delete { id: String },
    /// Cars from a manufacturer (case-insensitive)
    SearchCompany { company: String },
    /// Cars of a model (case-insensitive)
    SearchModel { model: String },
    /// Cars owned by a principal
    ByOwner { owner: String },
    /// Cars priced within an inclusive range
    PriceRange { min: String, max: String },
    /// First car with exactly this price
    ByPrice { price: String },
    /// Most recently created car
    Newest,
    /// Earliest created car
    Oldest,
    /// Suggested cars
    Recommend(RecommendArgs),
    /// Ownership and timestamps of a car
    History { id: String },
    /// Transfer a car to a new owner
    SetOwner { id: String, owner: String },
    /// Change the image of a car
    SetImage { id: String, image: String },
}

#[derive(Args)]
pub struct PayloadArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub model: String,
    /// Engine displacement in cc (0 for electric)
    #[arg(long = "cc", default_value_t = 0)]
    pub cubic_capacity_of_engine: u32,
    #[arg(long)]
    pub price: u64,
    /// Top speed in km/h
    #[arg(long)]
    pub top_speed: u32,
    #[arg(long = "company")]
    pub company_name: String,
    #[arg(long)]
    pub image: String,
}

impl PayloadArgs {
    pub fn into_payload(self) -> CarPayload {
        CarPayload {
            name: self.name,
            model: self.model,
            cubic_capacity_of_engine: self.cubic_capacity_of_engine,
            price: self.price,
            top_speed: self.top_speed,
            company_name: self.company_name,
            image: self.image,
        }
    }
}

#[derive(Args)]
pub struct RecommendArgs {
    #[arg(long = "company")]
    pub company_name: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub max_price: Option<u64>,
    #[arg(long)]
    pub min_top_speed: Option<u32>,
}

impl RecommendArgs {
    pub fn into_preferences(self) -> Preferences {
        Preferences {
            company_name: self.company_name,
            model: self.model,
            max_price: self.max_price,
            min_top_speed: self.min_top_speed,
        }
    }
}
