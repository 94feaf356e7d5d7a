//! Create an installment ticket and print where to send the customer
//!
//! Requires `AZKIVAM_API_KEY` and `AZKIVAM_MERCHANT_ID`; `AZKIVAM_BASE_URL`
//! optionally points at another host.

use azkivam::{AzkiGateway, Item, TicketRequest};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let gateway = AzkiGateway::from_env()?;

    let request = TicketRequest::create(
        1_200_000,
        "https://shop.example/azki/callback",
        "https://shop.example/azki/failed",
    )
    .with_mobile_number("09120000000")
    .with_item(Item::new(
        "Espresso machine",
        1,
        1_200_000,
        "https://shop.example/products/espresso",
    ));

    println!("Creating ticket...");
    let response = gateway.create_ticket(&request).await?;

    match response.redirect_url() {
        Some(url) => {
            println!("Ticket: {}", response.ticket_id().unwrap_or("<unknown>"));
            println!("Redirect customer to: {}", url);
        }
        None => {
            println!(
                "Ticket rejected (http {}, code {:?}): {}",
                response.http_status(),
                response.code(),
                response.message().unwrap_or("no message")
            );
        }
    }

    if let Some(ticket_id) = response.ticket_id() {
        let status = gateway.ticket_status(ticket_id).await?;
        println!(
            "Status: successful={} cancelled={}",
            status.is_successful(),
            status.is_cancelled()
        );
    }

    Ok(())
}
