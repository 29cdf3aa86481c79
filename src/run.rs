use dotenvy::dotenv;
use reqwest::ClientBuilder;
use x402_chat_reqwest::{
    CallOutcome, HttpRequest, PaymentCallError, ReqwestWithPayments, ReqwestWithPaymentsBuild,
};
use x402_chat_types::PaymentReceipt;

use crate::chat::{ChatRequest, read_reply};
use crate::config::Config;
use crate::sig_down::SigDown;
use crate::telemetry;

/// Sends one chat message, paying for it if the endpoint asks.
///
/// - Loads `.env` variables and reads the command line.
/// - Installs the tracing subscriber.
/// - POSTs `{"messages":[{"role":"user",...}]}` through a payment-aware client.
/// - Prints the assistant reply and the settlement receipt.
///
/// SIGINT or SIGTERM abandon the call.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env variables
    dotenv().ok();
    telemetry::init()?;

    let config = Config::load()?;
    if config.is_default_message() {
        println!("Tip: provide your own message with --message or CHAT_MESSAGE=\"...\"");
    }

    let client = ClientBuilder::new()
        .timeout(config.timeout())
        .with_payments(config.signer().clone(), config.ceiling())
        .build()?;
    let sig_down = SigDown::try_new()?;

    println!(
        "Sending x402 chat request to {} from {}",
        config.url(),
        config.signer().address()
    );
    println!("Message: \"{}\"", config.message());
    tracing::debug!(ceiling = %config.ceiling(), "Spending ceiling");

    let request =
        HttpRequest::post(config.url().clone()).json(&ChatRequest::single(config.message()))?;
    let outcome = match client
        .send_cancellable(request, &sig_down.cancellation_token())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            report_failure(&e);
            return Err(e.into());
        }
    };
    report_outcome(&outcome)
}

fn report_outcome(outcome: &CallOutcome) -> Result<(), Box<dyn std::error::Error>> {
    let reply = read_reply(&outcome.response)?;
    println!("\nChat response:\n{reply}");
    match &outcome.receipt {
        Some(receipt) => print_receipt(receipt),
        None if outcome.paid => println!("\nPaid, but the server sent no payment receipt"),
        None => println!("\nNo payment was required"),
    }
    Ok(())
}

fn print_receipt(receipt: &PaymentReceipt) {
    println!("\nPayment details:");
    println!("  success:     {}", receipt.success);
    println!("  transaction: {}", receipt.transaction);
    println!("  network:     {}", receipt.network);
    println!("  payer:       {}", receipt.payer);
    if let Some(amount) = &receipt.amount {
        println!("  amount:      {amount}");
    }
    if let Some(timestamp) = &receipt.timestamp {
        println!("  timestamp:   {timestamp}");
    }
}

fn report_failure(error: &PaymentCallError) {
    if error.payment_sent() {
        tracing::error!(
            %error,
            "Payment may have been sent; check the payer account before trying again"
        );
    } else {
        tracing::error!(%error, "No payment was made; safe to try again");
    }
    if let PaymentCallError::PaymentRejected {
        receipt: Some(receipt),
        ..
    } = error
    {
        print_receipt(receipt);
    }
}
