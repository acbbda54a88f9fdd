//! Command-line entry point for the suppliers client.
//!
//! Every subcommand stands in for one button on the original form page:
//! field flags overlay the persisted form session the way typing into the
//! form preceded a button press, the operation runs, and the resulting
//! flash line, form state, and results table are printed before the
//! session is written back.

mod session;

use std::env;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use suppliers_api::{API_BASE_ENV, ClientConfig, SupplierClient, default_base_url};
use suppliers_form::{FormController, FormError, FormFields};
use suppliers_types::{ApiRevision, SearchCriteria};
use tracing::Level;

use crate::session::FormSession;

#[derive(Parser)]
#[command(name = "suppliers", version, about = "Terminal client for the supplier REST service")]
struct Cli {
    /// Base URL of the supplier service (overrides SUPPLIERS_API_BASE).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API revision to talk to: modern or legacy.
    #[arg(long, global = true)]
    revision: Option<ApiRevision>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a supplier from the form fields.
    Create(FieldArgs),
    /// Update the supplier named by the id field.
    Update(FieldArgs),
    /// Fetch a supplier into the form.
    Retrieve(IdArgs),
    /// Delete the supplier named by the id field.
    Delete(IdArgs),
    /// Reset every form field without calling the service.
    Clear,
    /// Search with the filled form fields as criteria.
    Search(FieldArgs),
    /// Fetch all suppliers.
    List,
    /// Add products to the supplier named by the id field.
    AddProducts(AddProductsArgs),
    /// Print the current form session.
    Show,
}

/// Field flags shared by create, update, and search. Omitted flags keep
/// whatever the session already holds.
#[derive(Args, Debug, Default)]
struct FieldArgs {
    /// Supplier id field.
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Comma-separated product ids, e.g. "1, 2, 3".
    #[arg(long)]
    products: Option<String>,
}

#[derive(Args, Debug, Default)]
struct IdArgs {
    /// Supplier id. Falls back to the session's id field.
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args, Debug, Default)]
struct AddProductsArgs {
    /// Supplier id. Falls back to the session's id field.
    #[arg(long)]
    id: Option<String>,
    /// Comma-separated product ids to append.
    #[arg(long)]
    products: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    let client = SupplierClient::new(config).context("configure supplier client")?;

    let session = FormSession::open();
    let mut controller = FormController::with_form(client, session.form());

    let outcome = run_command(&mut controller, &cli.command).await;

    print_view(&controller, &cli.command);
    session.store(&controller.form).context("persist form session")?;

    if outcome.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() {
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .try_init();
}

/// Merge environment configuration with command-line overrides.
///
/// Switching revisions moves the default base path along unless a base URL
/// was given explicitly.
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("read client configuration")?;
    if let Some(revision) = cli.revision {
        if cli.base_url.is_none() && env::var(API_BASE_ENV).is_err() {
            config.base_url = default_base_url(revision);
        }
        config.revision = revision;
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    Ok(config)
}

async fn run_command(controller: &mut FormController<SupplierClient>, command: &Command) -> Result<(), FormError> {
    match command {
        Command::Create(fields) => {
            overlay(&mut controller.form, fields);
            controller.create().await
        }
        Command::Update(fields) => {
            overlay(&mut controller.form, fields);
            controller.update().await
        }
        Command::Retrieve(args) => {
            overlay_id(&mut controller.form, args.id.as_deref());
            controller.retrieve().await
        }
        Command::Delete(args) => {
            overlay_id(&mut controller.form, args.id.as_deref());
            controller.delete().await
        }
        Command::Clear => {
            controller.clear();
            Ok(())
        }
        Command::Search(fields) => {
            overlay(&mut controller.form, fields);
            let criteria = search_criteria(controller, fields.id.as_deref());
            controller.search_with(criteria).await
        }
        Command::List => controller.list().await,
        Command::AddProducts(args) => {
            overlay_id(&mut controller.form, args.id.as_deref());
            if let Some(products) = &args.products {
                controller.form.products = products.clone();
            }
            controller.add_products().await
        }
        Command::Show => Ok(()),
    }
}

fn overlay(form: &mut FormFields, fields: &FieldArgs) {
    if let Some(id) = &fields.id {
        form.id = id.clone();
    }
    if let Some(name) = &fields.name {
        form.name = name.clone();
    }
    if let Some(address) = &fields.address {
        form.address = address.clone();
    }
    if let Some(email) = &fields.email {
        form.email = email.clone();
    }
    if let Some(products) = &fields.products {
        form.products = products.clone();
    }
}

fn overlay_id(form: &mut FormFields, id: Option<&str>) {
    if let Some(id) = id {
        form.id = id.to_string();
    }
}

/// Criteria for the search command: an explicit id filter first when one
/// was given, then the filled form fields.
fn search_criteria(controller: &FormController<SupplierClient>, explicit_id: Option<&str>) -> SearchCriteria {
    let mut criteria = SearchCriteria::new();
    if let Some(id) = explicit_id {
        criteria.push("id", id);
    }
    let from_form = controller.criteria();
    for (field, value) in from_form.iter() {
        criteria.push(field, value);
    }
    criteria
}

fn print_view(controller: &FormController<SupplierClient>, command: &Command) {
    if !controller.flash.is_empty() {
        println!("{}", controller.flash.line());
        println!();
    }

    let form = &controller.form;
    println!("id:       {}", form.id);
    println!("name:     {}", form.name);
    println!("address:  {}", form.address);
    println!("email:    {}", form.email);
    println!("products: {}", form.products);

    if matches!(command, Command::Search(_) | Command::List) {
        println!();
        println!("{}", controller.results.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> FormController<SupplierClient> {
        let client = SupplierClient::new(ClientConfig::default()).unwrap();
        FormController::new(client)
    }

    #[test]
    fn overlay_keeps_session_values_for_omitted_flags() {
        let mut form = FormFields {
            name: "Acme".into(),
            email: "a@b.c".into(),
            ..FormFields::default()
        };
        overlay(
            &mut form,
            &FieldArgs {
                name: Some("Globex".into()),
                ..FieldArgs::default()
            },
        );

        assert_eq!(form.name, "Globex");
        assert_eq!(form.email, "a@b.c");
    }

    #[test]
    fn search_criteria_place_the_explicit_id_first() {
        let mut controller = controller();
        controller.form.name = "Acme".into();

        let criteria = search_criteria(&controller, Some("7"));
        let fields: Vec<(String, String)> = criteria.iter().map(|(k, v)| (k.into(), v.into())).collect();

        assert_eq!(fields, vec![("id".into(), "7".into()), ("name".into(), "Acme".into())]);
    }
}
