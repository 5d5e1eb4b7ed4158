use super::ui;
use crate::core::rate::{ExchangeRateInfo, LastViewedScreen};
use crate::presenter::{CalculatorAction, CalculatorState, CalculatorViewModel};
use crate::service::{RateCacheService, ResumeTarget};
use anyhow::{Context, Result, bail};

fn print_header(info: &ExchangeRateInfo) {
    println!(
        "{} {} ({})",
        ui::style_text("Calculator:", ui::StyleType::Title),
        info.currency_code,
        info.name
    );
    println!(
        "{}\n",
        ui::style_text(
            &format!("1 USD = {:.4} {}", info.rate, info.currency_code),
            ui::StyleType::Subtle
        )
    );
}

/// Converts `amount` USD into `code` using the cached rate.
pub async fn run(service: &RateCacheService, code: &str, amount: &str) -> Result<()> {
    let code = code.trim().to_uppercase();

    // populates the cache on first use, otherwise served locally
    service
        .get_rates()
        .await
        .context("Failed to load exchange rates")?;
    let Some(info) = service.rate_info(&code).await? else {
        bail!("No exchange rate found for {code}");
    };

    print_header(&info);
    let mut view_model = CalculatorViewModel::new(info);
    let state = view_model
        .handle(CalculatorAction::SubmitInput(amount.to_string()))
        .clone();

    service
        .record_screen(LastViewedScreen::Calculator {
            currency_code: view_model.currency_code().to_string(),
        })
        .await
        .context("Failed to record last viewed screen")?;

    match state {
        CalculatorState::Result(text) => {
            println!("{}", ui::style_text(&text, ui::StyleType::Value));
            Ok(())
        }
        CalculatorState::Error(message) => bail!(message),
    }
}

/// Reopens the screen recorded by the previous run.
pub async fn resume(service: &RateCacheService) -> Result<()> {
    match service.resume_target().await? {
        ResumeTarget::RateList => super::rates::run(service, None).await,
        ResumeTarget::Calculator(info) => {
            print_header(&info);
            let view_model = CalculatorViewModel::new(info);
            if let CalculatorState::Result(text) = view_model.state() {
                println!("{}", ui::style_text(text, ui::StyleType::Value));
            }
            println!(
                "\n{}",
                ui::style_text(
                    &format!(
                        "Run `xrate convert {} <AMOUNT>` to convert",
                        view_model.currency_code()
                    ),
                    ui::StyleType::Subtle
                )
            );
            Ok(())
        }
    }
}
