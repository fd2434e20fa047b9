//! Storefront CLI
//!
//! Command-line interface for the Storefront API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;

use storefront_client::StorefrontClient;
use storefront_types::{
    CheckoutProduct, CheckoutRequest, CheckoutStatus, Document, NewProduct, NewReview, NewUser,
    PaymentToken, PlaceOrderRequest, ProductUpdate, TokenCard,
};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about = "Storefront API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Storefront API
    #[arg(
        long,
        env = "STOREFRONT_API_URL",
        default_value = "http://localhost:5000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Product catalog
    Product {
        #[command(subcommand)]
        action: ProductCommands,
    },
    /// Orders
    Order {
        #[command(subcommand)]
        action: OrderCommands,
    },
    /// Users and admins
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Reviews
    Review {
        #[command(subcommand)]
        action: ReviewCommands,
    },
    /// Charge a card token for one product
    Checkout {
        /// Product name
        #[arg(long)]
        name: String,
        /// Price in dollars
        #[arg(long)]
        price: f64,
        /// Card token (e.g. tok_visa)
        #[arg(long)]
        token: String,
        /// Receipt email
        #[arg(long)]
        email: String,
        /// Name on the card, used for shipping
        #[arg(long)]
        card_name: Option<String>,
        #[arg(long)]
        line1: Option<String>,
        #[arg(long)]
        line2: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        zip: Option<String>,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum ProductCommands {
    /// List all products
    List,
    /// Get a product
    Get { id: String },
    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        /// Extra field as key=value (value parsed as JSON when possible)
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Update some fields of a product
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Subcommand)]
enum OrderCommands {
    /// List orders
    List {
        /// Only orders placed with this email
        #[arg(long)]
        email: Option<String>,
    },
    /// Place an order
    Place {
        #[arg(long)]
        email: String,
        /// Product reference: an id, a name or a JSON object
        #[arg(long)]
        product: String,
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Set the status of an order
    Status { id: String, status: String },
    /// Mark an order as paid
    Paid { id: String },
    /// Delete an order
    Delete { id: String },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user
    Register {
        email: String,
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
    },
    /// Look a user up by email
    Get { email: String },
    /// Promote a user to admin
    Promote { email: String },
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// List all reviews
    List,
    /// Add a review
    Add {
        #[arg(long = "field", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },
}

/// Parses `key=value` pairs; values that are valid JSON keep their type.
fn parse_fields(pairs: &[String]) -> Result<Document> {
    let mut doc = Document::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected KEY=VALUE, got '{}'", pair))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        doc.insert(key.to_string(), value);
    }
    Ok(doc)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = StorefrontClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let message = client.health().await?;
            println!("✓ {}", message);
        }

        Commands::Product { action } => match action {
            ProductCommands::List => print_json(&client.list_products().await?)?,
            ProductCommands::Get { id } => print_json(&client.get_product(&id).await?)?,
            ProductCommands::Add {
                name,
                price,
                fields,
            } => {
                let product = NewProduct {
                    name,
                    price,
                    details: parse_fields(&fields)?,
                };
                print_json(&client.add_product(&product).await?)?;
            }
            ProductCommands::Update {
                id,
                name,
                price,
                fields,
            } => {
                let mut fields = parse_fields(&fields)?;
                if let Some(name) = name {
                    fields.insert("name".into(), name.into());
                }
                if let Some(price) = price {
                    fields.insert("price".into(), price.into());
                }
                let update = ProductUpdate { fields };
                print_json(&client.update_product(&id, &update).await?)?;
            }
            ProductCommands::Delete { id } => print_json(&client.delete_product(&id).await?)?,
        },

        Commands::Order { action } => match action {
            OrderCommands::List { email } => {
                print_json(&client.list_orders(email.as_deref()).await?)?
            }
            OrderCommands::Place {
                email,
                product,
                fields,
            } => {
                let order = PlaceOrderRequest {
                    email,
                    product: serde_json::from_str(&product).unwrap_or(Value::String(product)),
                    extra: parse_fields(&fields)?,
                };
                print_json(&client.place_order(&order).await?)?;
            }
            OrderCommands::Status { id, status } => {
                let modified = client.update_order_status(&id, &status).await?;
                println!("{} order(s) updated", modified);
            }
            OrderCommands::Paid { id } => {
                let modified = client.mark_order_paid(&id).await?;
                println!("{} order(s) marked paid", modified);
            }
            OrderCommands::Delete { id } => print_json(&client.delete_order(&id).await?)?,
        },

        Commands::User { action } => match action {
            UserCommands::Register { email, fields } => {
                let user = NewUser {
                    email,
                    role: None,
                    extra: parse_fields(&fields)?,
                };
                print_json(&client.register_user(&user).await?)?;
            }
            UserCommands::Get { email } => print_json(&client.get_user(&email).await?)?,
            UserCommands::Promote { email } => print_json(&client.promote_admin(&email).await?)?,
        },

        Commands::Review { action } => match action {
            ReviewCommands::List => print_json(&client.list_reviews().await?)?,
            ReviewCommands::Add { fields } => {
                let review = NewReview {
                    fields: parse_fields(&fields)?,
                };
                print_json(&client.add_review(&review).await?)?;
            }
        },

        Commands::Checkout {
            name,
            price,
            token,
            email,
            card_name,
            line1,
            line2,
            city,
            country,
            zip,
        } => {
            let req = CheckoutRequest {
                product: CheckoutProduct { name, price },
                token: PaymentToken {
                    id: token,
                    email,
                    card: TokenCard {
                        name: card_name,
                        address_line1: line1,
                        address_line2: line2,
                        address_city: city,
                        address_country: country,
                        address_zip: zip,
                    },
                },
            };
            let response = client.checkout(&req).await?;
            print_json(&response)?;
            if response.status == CheckoutStatus::Failure {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields_keeps_json_types() {
        let doc = parse_fields(&[
            "rating=5".to_string(),
            "name=Ada".to_string(),
            "tags=[\"new\"]".to_string(),
        ])
        .unwrap();

        assert_eq!(doc["rating"], serde_json::json!(5));
        assert_eq!(doc["name"], serde_json::json!("Ada"));
        assert_eq!(doc["tags"], serde_json::json!(["new"]));
    }

    #[test]
    fn test_parse_fields_rejects_missing_separator() {
        assert!(parse_fields(&["rating".to_string()]).is_err());
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from(["storefront", "order", "list", "--email", "a@b.com"]).unwrap();
        assert_eq!(cli.api_url, "http://localhost:5000");
        assert!(matches!(
            cli.command,
            Commands::Order {
                action: OrderCommands::List { email: Some(ref e) }
            } if e == "a@b.com"
        ));
    }
}
