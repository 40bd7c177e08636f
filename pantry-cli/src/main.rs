use anyhow::Result;
use clap::{Parser, Subcommand};
use pantry_core::{ExpirationSummary, RecipeRecommendation, RecommendationResponse};

mod app;
mod config;
mod dispatch;
mod item_cmd;
mod notifiers;
mod observability;
mod recipe_cmd;
mod scheduler;
mod state;
mod sweep_cmd;

use app::{App, print_items};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PANTRY_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "pantry",
    version,
    long_version = LONG_VERSION,
    about = "Track fridge expiration dates and find recipes you can cook"
)]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fridge inventory
    Item {
        #[command(subcommand)]
        command: item_cmd::ItemCommand,
    },

    /// Recipe book
    Recipe {
        #[command(subcommand)]
        command: recipe_cmd::RecipeCommand,
    },

    /// Rank recipes by how much of them the non-expired inventory covers
    Recommend {
        /// Minimum match percentage, 0-100
        #[arg(long)]
        min_match: Option<f64>,

        /// Only recipes with every ingredient on hand
        #[arg(long, default_value_t = false)]
        can_make_only: bool,
    },

    /// Recipes that use an ingredient, scored against the inventory
    ForIngredient { name: String },

    /// Expired, expiring-soon and expiring-this-week buckets
    Summary,

    /// Expiration sweep: run once or on a daily timer
    Sweep {
        #[command(subcommand)]
        command: sweep_cmd::SweepCommand,
    },

    /// Manage ~/.pantry/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    observability::init_logging(&cfg.log)?;

    let app = App {
        cfg,
        json: cli.json,
    };

    match cli.command {
        Command::Item { command } => item_cmd::run(&app, command)?,
        Command::Recipe { command } => recipe_cmd::run(&app, command)?,
        Command::Recommend {
            min_match,
            can_make_only,
        } => {
            let store = state::load_store()?;
            let resp = app
                .service(&store)?
                .recipe_recommendations(min_match, Some(can_make_only))?;
            app.emit(&resp, print_recommendations)?;
        }
        Command::ForIngredient { name } => {
            let store = state::load_store()?;
            let recs = app.service(&store)?.recipes_for_ingredient(&name)?;
            app.emit(&recs, |recs| {
                if recs.is_empty() {
                    println!("No recipes use '{name}'.");
                }
                for r in recs {
                    println!("{}", recommendation_line(r));
                }
            })?;
        }
        Command::Summary => {
            let store = state::load_store()?;
            let summary = app.service(&store)?.expiration_summary()?;
            app.emit(&summary, print_summary)?;
        }
        Command::Sweep { command } => sweep_cmd::run(&app, command).await?,
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&app.cfg)?);
            }
        },
    }

    Ok(())
}

fn recommendation_line(r: &RecipeRecommendation) -> String {
    let mut line = format!(
        "#{:<4} {} | {:.2}% | {}",
        r.recipe.id, r.recipe.name, r.match_percentage, r.recommendation
    );
    if !r.missing_ingredients.is_empty() {
        line.push_str(&format!(" | missing: {}", r.missing_ingredients.join(", ")));
    }
    line
}

fn print_recommendations(resp: &RecommendationResponse) {
    println!(
        "{} of {} recipes match ({} ingredients on hand)\n",
        resp.matching_recipes,
        resp.total_recipes,
        resp.available_ingredients.len()
    );
    for r in &resp.recommendations {
        println!("{}", recommendation_line(r));
    }
}

fn print_summary(s: &ExpirationSummary) {
    println!("Expired ({}):", s.expired_count);
    print_items(&s.expired_items);
    println!("\nExpiring soon ({}):", s.expiring_soon_count);
    print_items(&s.expiring_soon_items);
    println!("\nExpiring this week ({}):", s.expiring_this_week_count);
    print_items(&s.expiring_this_week_items);
}
