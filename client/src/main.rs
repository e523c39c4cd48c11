//! Stockbill admin shell
//!
//! Command-line front end for the inventory and billing backend. Each
//! subcommand corresponds to one page of the admin client.

use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use shared::{format_price, format_quantity, BillType, CategoryCreate, Item, ItemCreate, UserCreate};
use stockbill_client::views::{
    filter_alerts, filter_bills, filter_categories, filter_items, low_stock_preview, showing_summary,
    AlertStatusFilter, BillFilter, DashboardSummary, ItemFilter, NotificationSettingsForm,
};
use stockbill_client::workflow::BillWorkflow;
use stockbill_client::{AppContext, ClientError, ClientResult, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

#[derive(Parser)]
#[command(name = "stockbill")]
#[command(about = "Inventory and billing admin client")]
#[command(
    after_help = "Environment:\n  STOCKBILL_ENVIRONMENT    Selects config/<environment>.toml\n  STOCKBILL__API__BASE_URL Backend base URL override\n  RUST_LOG                 Log filter"
)]
struct Cli {
    /// Print raw JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOCKBILL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOCKBILL_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        notification_email: Option<String>,
    },
    /// List or edit catalog items
    Items {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<i64>,
        #[command(subcommand)]
        command: Option<ItemsCommand>,
    },
    /// List or edit categories
    Categories {
        #[arg(long, default_value = "")]
        search: String,
        #[command(subcommand)]
        command: Option<CategoriesCommand>,
    },
    /// List bills, newest first
    Bills {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long = "type")]
        bill_type: Option<BillType>,
    },
    /// Show or create a bill
    Bill {
        #[command(subcommand)]
        command: BillCommand,
    },
    /// List low stock alerts
    Alerts {
        #[arg(long, default_value_t = AlertStatusFilter::Active)]
        status: AlertStatusFilter,
        #[command(subcommand)]
        command: Option<AlertsCommand>,
    },
    /// Inventory overview
    Dashboard,
    /// Notification settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Subcommand)]
enum BillCommand {
    /// Print a saved bill
    Show { bill_id: String },
    /// Start a bill, add lines and save it
    Create {
        #[arg(long = "type")]
        bill_type: BillType,
        /// Line item as MODEL=QTY, repeatable, sent in the given order
        #[arg(long = "line", value_parser = parse_line, required = true)]
        lines: Vec<(String, i64)>,
    },
}

#[derive(Subcommand)]
enum ItemsCommand {
    /// Create an item; the server assigns its model number
    Add {
        #[command(flatten)]
        fields: ItemFields,
    },
    /// Change fields of an item; omitted fields keep their value
    Update {
        id: i64,
        #[command(flatten)]
        fields: ItemFields,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Download an item's QR code as PNG
    Qr {
        id: i64,
        /// Defaults to <MODEL>_qr.png
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ItemFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<i64>,
    #[arg(long)]
    quantity: Option<i64>,
    #[arg(long)]
    buying_price: Option<Decimal>,
    #[arg(long)]
    selling_price: Option<Decimal>,
    #[arg(long)]
    description: Option<String>,
}

impl ItemFields {
    /// Overlay the given fields on a base form
    fn apply(self, mut form: ItemCreate) -> ItemCreate {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(category) = self.category {
            form.category_id = category;
        }
        if let Some(quantity) = self.quantity {
            form.quantity = quantity;
        }
        if let Some(price) = self.buying_price {
            form.buying_price = price;
        }
        if let Some(price) = self.selling_price {
            form.selling_price = price;
        }
        if self.description.is_some() {
            form.description = self.description;
        }
        form
    }
}

#[derive(Subcommand)]
enum CategoriesCommand {
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Rename a category or change its description
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AlertsCommand {
    /// Mark an alert as resolved
    Resolve { id: i64 },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        threshold: Option<i64>,
    },
    /// Send a test notification email
    TestEmail,
}

fn parse_line(raw: &str) -> Result<(String, i64), String> {
    let (model, qty) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected MODEL=QTY, got '{}'", raw))?;
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity in '{}'", raw))?;
    Ok((model.trim().to_string(), qty))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockbill=info,stockbill_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load()?;
    tracing::debug!(environment = %config.environment, "Configuration loaded");

    let mut ctx = AppContext::from_config(config)?;

    if let Err(e) = run(&mut ctx, cli.command, cli.json).await {
        let message = e.user_message("Request failed");
        tracing::error!(code = e.code(), "{}", e);
        if matches!(e, ClientError::Unauthorized) {
            eprintln!("{} Run `stockbill login`.", message);
        } else {
            eprintln!("Error: {}", message);
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(ctx: &mut AppContext, command: Command, json: bool) -> ClientResult<()> {
    match command {
        Command::Login { email, password } => {
            let gateway = ctx.gateway.clone();
            ctx.auth.login(gateway.as_ref(), &email, &password).await?;
            println!("Signed in as {}", email.trim());
        }
        Command::Logout => {
            ctx.teardown()?;
            println!("Signed out");
        }
        Command::Register {
            email,
            password,
            phone,
            notification_email,
        } => {
            let form = UserCreate {
                email,
                password,
                phone_number: phone,
                notification_email,
            };
            let gateway = ctx.gateway.clone();
            let user = ctx.auth.register(gateway.as_ref(), form).await?;
            println!("Registered {}. Sign in with `stockbill login`.", user.email);
        }
        Command::Items {
            command: Some(command),
            ..
        } => items(ctx, command, json).await?,
        Command::Items {
            search,
            category,
            command: None,
        } => {
            let token = ctx.pages.mount();
            ctx.refresh_items().await?;
            if !token.is_current() {
                return Ok(());
            }
            let items = ctx.items.snapshot();
            let filter = ItemFilter {
                search,
                category_id: category,
            };
            let shown = filter_items(&items, &filter);
            if json {
                return print_json(&shown);
            }
            let threshold = ctx.low_stock_threshold();
            for item in &shown {
                println!(
                    "{:<14} {:<28} {:<16} {:>12} {:>10} {:>10}  {}",
                    item.model_number,
                    item.name,
                    item.category.name,
                    format_quantity(item.quantity),
                    format_price(item.buying_price),
                    format_price(item.selling_price),
                    item.stock_level(threshold)
                );
            }
            println!("{}", showing_summary(shown.len(), items.len(), "items"));
        }
        Command::Categories {
            command: Some(command),
            ..
        } => categories(ctx, command, json).await?,
        Command::Categories {
            search,
            command: None,
        } => {
            let Some(categories) = ctx.load_page(ctx.gateway.list_categories()).await? else {
                return Ok(());
            };
            let shown = filter_categories(&categories, &search);
            if json {
                return print_json(&shown);
            }
            for category in &shown {
                println!(
                    "{:>4}  {:<24} {}",
                    category.id,
                    category.name,
                    category.description.as_deref().unwrap_or("")
                );
            }
            println!("{}", showing_summary(shown.len(), categories.len(), "categories"));
        }
        Command::Bills { search, bill_type } => {
            let Some(bills) = ctx.load_page(ctx.gateway.list_bills()).await? else {
                return Ok(());
            };
            let shown = filter_bills(&bills, &BillFilter { search, bill_type });
            if json {
                return print_json(&shown);
            }
            for bill in &shown {
                println!(
                    "{:<20} {:<5} {}",
                    bill.bill_id,
                    bill.bill_type,
                    bill.created_at.format("%Y-%m-%d %H:%M")
                );
            }
            println!("{}", showing_summary(shown.len(), bills.len(), "bills"));
        }
        Command::Bill { command } => match command {
            BillCommand::Show { bill_id } => {
                let Some(bill) = ctx.load_page(ctx.gateway.print_bill(&bill_id)).await? else {
                    return Ok(());
                };
                if json {
                    return print_json(&bill);
                }
                println!("Bill {} ({})", bill.bill_id, bill.bill_type);
                for line in &bill.items {
                    println!(
                        "  {:<28} {:>6} x {:>10} = {:>12}",
                        line.item,
                        line.quantity,
                        format_price(line.price),
                        format_price(line.total)
                    );
                }
                println!("Grand total: {}", format_price(bill.grand_total));
            }
            BillCommand::Create { bill_type, lines } => create_bill(ctx, bill_type, lines, json).await?,
        },
        Command::Alerts { status, command } => match command {
            Some(AlertsCommand::Resolve { id }) => {
                ctx.gateway.resolve_alert(id).await?;
                println!("Alert {} resolved", id);
            }
            None => {
                let Some(alerts) = ctx
                    .load_page(ctx.gateway.list_alerts(status.needs_resolved()))
                    .await?
                else {
                    return Ok(());
                };
                let shown = filter_alerts(&alerts, status);
                if json {
                    return print_json(&shown);
                }
                for alert in &shown {
                    println!(
                        "#{:<5} item {:<6} qty {:<4} threshold {:<4} {} {}",
                        alert.id,
                        alert.item_id,
                        alert.quantity_at_alert,
                        alert.alert_threshold,
                        if alert.is_resolved { "resolved" } else { "active" },
                        alert.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
                println!("{}", showing_summary(shown.len(), alerts.len(), "alerts"));
            }
        },
        Command::Dashboard => {
            let token = ctx.pages.mount();
            ctx.refresh_items().await?;
            // Stats are optional on the dashboard
            let stats = match ctx.gateway.alert_stats().await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::warn!("Alert stats unavailable: {}", e);
                    None
                }
            };
            let Some(stats) = token.accept(stats) else {
                return Ok(());
            };
            let items = ctx.items.snapshot();
            let threshold = ctx.low_stock_threshold();
            let summary = DashboardSummary::compute(&items, stats.as_ref(), threshold);
            println!("Total items:      {}", summary.total_items);
            println!("Low stock:        {}", summary.low_stock_items);
            println!("Out of stock:     {}", summary.out_of_stock_items);
            println!("Inventory value:  {}", format_price(summary.total_value));
            println!("Active alerts:    {}", summary.active_alerts);

            let (low, hidden) = low_stock_preview(&items, threshold);
            if !low.is_empty() {
                println!("\nItems low in stock:");
                for item in &low {
                    println!("  {:<14} {:<28} {:>6}", item.model_number, item.name, item.quantity);
                }
                if hidden > 0 {
                    println!("  ... and {} more. Run `stockbill items` to see all.", hidden);
                }
            }
        }
        Command::Settings { command } => settings(ctx, command, json).await?,
    }
    Ok(())
}

async fn create_bill(
    ctx: &mut AppContext,
    bill_type: BillType,
    lines: Vec<(String, i64)>,
    json: bool,
) -> ClientResult<()> {
    ctx.refresh_items().await?;
    let mut workflow: BillWorkflow = ctx.new_bill_workflow(bill_type);

    let bill_id = workflow.start().await?.to_string();
    println!("Started {} bill {}", bill_type, bill_id);

    for (model_number, quantity) in &lines {
        if let Err(e) = workflow.add_line_item(&ctx.items, model_number, *quantity) {
            workflow.cancel()?;
            println!("Bill {} cancelled", bill_id);
            return Err(e);
        }
    }
    println!(
        "{} line(s), total {}",
        workflow.line_items().len(),
        format_price(workflow.grand_total())
    );

    // Each save attempt after a rejection is one the user asked for
    let outcome = loop {
        match workflow.save().await {
            Ok(outcome) => break outcome,
            Err(e) => {
                let progress = workflow.progress();
                eprintln!(
                    "Bill {} is partially saved: {}/{} lines committed. {}",
                    bill_id,
                    progress.committed,
                    progress.total,
                    workflow.last_error().unwrap_or_default()
                );
                let retry = !workflow.status().is_terminal()
                    && !matches!(e, ClientError::Unauthorized)
                    && confirm("Retry saving the remaining lines?")?;
                if !retry {
                    return Err(e);
                }
                tracing::debug!(code = e.code(), "Resuming bill save");
            }
        }
    };

    if json {
        return print_json(&serde_json::json!({
            "bill_id": outcome.bill_id,
            "bill_type": outcome.bill_type,
            "lines": outcome.lines.len(),
            "grand_total": outcome.grand_total,
        }));
    }
    for line in &outcome.lines {
        println!(
            "  {:<14} {:>6} x {:>10} = {:>12}",
            line.model_number,
            line.quantity,
            format_price(line.unit_price),
            format_price(line.line_total)
        );
    }
    println!(
        "Saved bill {}, grand total {}",
        outcome.bill_id,
        format_price(outcome.grand_total)
    );
    Ok(())
}

async fn items(ctx: &mut AppContext, command: ItemsCommand, json: bool) -> ClientResult<()> {
    match command {
        ItemsCommand::Add { fields } => {
            let form = fields.apply(ItemCreate {
                name: String::new(),
                quantity: 0,
                buying_price: Decimal::ZERO,
                selling_price: Decimal::ZERO,
                description: None,
                category_id: 0,
            });
            let item = ctx.items.create(ctx.gateway.as_ref(), form).await?;
            if json {
                return print_json(&item);
            }
            println!("Item created: {} ({})", item.name, item.model_number);
            println!("QR code: stockbill items qr {}", item.id);
        }
        ItemsCommand::Update { id, fields } => {
            let current = current_item(ctx, id).await?;
            let form = fields.apply(ItemCreate::from(&current));
            let item = ctx.items.edit(ctx.gateway.as_ref(), id, form).await?;
            if json {
                return print_json(&item);
            }
            println!("Item updated: {} ({})", item.name, item.model_number);
        }
        ItemsCommand::Delete { id, yes } => {
            let current = current_item(ctx, id).await?;
            if !yes && !confirm(&format!("Are you sure you want to delete \"{}\"?", current.name))? {
                return Ok(());
            }
            ctx.items.delete(ctx.gateway.as_ref(), id).await?;
            println!("Item deleted");
        }
        ItemsCommand::Qr { id, output } => {
            let item = ctx.gateway.get_item(id).await?;
            let png = ctx.gateway.item_qr_code(id).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(format!("{}_qr.png", item.model_number)));
            std::fs::write(&path, &png)?;
            tracing::debug!(id, bytes = png.len(), "QR code saved");
            println!("QR code for {} saved to {}", item.model_number, path.display());
        }
    }
    Ok(())
}

/// Cached copy of an item, falling back to the server
async fn current_item(ctx: &mut AppContext, id: i64) -> ClientResult<Item> {
    ctx.refresh_items().await?;
    match ctx.items.get(id) {
        Some(item) => Ok(item.clone()),
        None => ctx.gateway.get_item(id).await,
    }
}

async fn categories(ctx: &mut AppContext, command: CategoriesCommand, json: bool) -> ClientResult<()> {
    match command {
        CategoriesCommand::Add { name, description } => {
            let form = category_form(name, description)?;
            let category = ctx.gateway.create_category(&form).await?;
            if json {
                return print_json(&category);
            }
            println!("Category created: {} (#{})", category.name, category.id);
        }
        CategoriesCommand::Update {
            id,
            name,
            description,
        } => {
            let current = ctx.gateway.get_category(id).await?;
            let form = category_form(
                name.unwrap_or(current.name),
                description.or(current.description),
            )?;
            let category = ctx.gateway.update_category(id, &form).await?;
            if json {
                return print_json(&category);
            }
            println!("Category updated: {}", category.name);
        }
        CategoriesCommand::Delete { id, yes } => {
            let current = ctx.gateway.get_category(id).await?;
            if !yes && !confirm(&format!("Are you sure you want to delete \"{}\"?", current.name))? {
                return Ok(());
            }
            ctx.gateway.delete_category(id).await?;
            println!("Category deleted");
        }
    }
    Ok(())
}

fn category_form(name: String, description: Option<String>) -> ClientResult<CategoryCreate> {
    let form = CategoryCreate {
        name: name.trim().to_string(),
        description: description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    };
    form.validate()?;
    Ok(form)
}

/// Ask a yes/no question on the terminal. Without a terminal the answer is no.
fn confirm(question: &str) -> ClientResult<bool> {
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }
    eprint!("{} [y/N] ", question);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn settings(ctx: &mut AppContext, command: SettingsCommand, json: bool) -> ClientResult<()> {
    let prefs = ctx.gateway.notification_preferences().await?;
    match command {
        SettingsCommand::Show => {
            if json {
                return print_json(&prefs);
            }
            let form = NotificationSettingsForm::from(prefs);
            println!("Notifications:   {}", if form.notification_enabled { "on" } else { "off" });
            println!("Email:           {}", form.notification_email);
            println!("Phone:           {}", form.phone_number);
            println!("Alert threshold: {}", form.alert_threshold);
        }
        SettingsCommand::Update {
            email,
            phone,
            enabled,
            threshold,
        } => {
            let mut form = NotificationSettingsForm::from(prefs);
            if let Some(email) = email {
                form.notification_email = email;
            }
            if let Some(phone) = phone {
                form.phone_number = phone;
            }
            if let Some(enabled) = enabled {
                form.notification_enabled = enabled;
            }
            if let Some(threshold) = threshold {
                form.alert_threshold = threshold;
            }
            let update = form.to_update()?;
            ctx.gateway.update_preferences(&update).await?;
            println!("Notification settings saved");
        }
        SettingsCommand::TestEmail => {
            NotificationSettingsForm::from(prefs).check_test_email()?;
            let sent = ctx.gateway.send_test_email().await?;
            println!("{} Check your email at {}", sent.message, sent.recipient);
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> ClientResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("LED-9W=3"), Ok(("LED-9W".to_string(), 3)));
        assert_eq!(parse_line(" SW=1 = 2"), Ok(("SW=1".to_string(), 2)));
        assert!(parse_line("LED-9W").is_err());
        assert!(parse_line("LED-9W=x").is_err());
    }

    #[test]
    fn test_bill_create_args() {
        let cli = Cli::try_parse_from([
            "stockbill", "bill", "create", "--type", "sell", "--line", "A=1", "--line", "B=2",
        ])
        .unwrap();
        match cli.command {
            Command::Bill {
                command: BillCommand::Create {
                    bill_type, lines, ..
                },
            } => {
                assert_eq!(bill_type, BillType::Sell);
                assert_eq!(lines.len(), 2);
            }
            _ => panic!("expected bill create"),
        }
        assert!(Cli::try_parse_from([
            "stockbill", "bill", "create", "--type", "sell", "--line", "A=1", "--retries", "2",
        ])
        .is_err());
    }

    #[test]
    fn test_item_update_keeps_omitted_fields() {
        let cli = Cli::try_parse_from([
            "stockbill", "items", "update", "7", "--selling-price", "12.50", "--name", " Fan ",
        ])
        .unwrap();
        let Command::Items {
            command: Some(ItemsCommand::Update { id, fields }),
            ..
        } = cli.command
        else {
            panic!("expected items update");
        };
        assert_eq!(id, 7);

        let base = ItemCreate {
            name: "Ceiling Fan".to_string(),
            quantity: 4,
            buying_price: Decimal::from(40),
            selling_price: Decimal::from(55),
            description: Some("56 inch".to_string()),
            category_id: 2,
        };
        let form = fields.apply(base).normalized();
        assert_eq!(form.name, "Fan");
        assert_eq!(form.selling_price, Decimal::new(1250, 2));
        assert_eq!(form.quantity, 4);
        assert_eq!(form.description.as_deref(), Some("56 inch"));
    }

    #[test]
    fn test_items_listing_still_default() {
        let cli = Cli::try_parse_from(["stockbill", "items", "--search", "led"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Items { command: None, ref search, .. } if search == "led"
        ));

        let cli = Cli::try_parse_from(["stockbill", "items", "qr", "3", "-o", "x.png"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Items { command: Some(ItemsCommand::Qr { id: 3, output: Some(_) }), .. }
        ));
    }

    #[test]
    fn test_category_form_validation() {
        let form = category_form("  Lighting ".to_string(), Some("  ".to_string())).unwrap();
        assert_eq!(form.name, "Lighting");
        assert!(form.description.is_none());

        let err = category_form("   ".to_string(), None).unwrap_err();
        assert_eq!(err.user_message("ignored"), "Category name is required");
    }
}
