use super::ui;
use crate::core::rate::LastViewedScreen;
use crate::presenter::{ExchangeRateViewModel, RateAction, RateListState};
use crate::service::RateCacheService;
use anyhow::{Context, Result};

fn display(state: RateListState) -> Result<()> {
    match state {
        RateListState::RatesLoaded(rates) if rates.is_empty() => {
            println!(
                "{}",
                ui::style_text("No matching exchange rates.", ui::StyleType::Subtle)
            );
            Ok(())
        }
        RateListState::RatesLoaded(rates) => {
            println!("{}", ui::rates_table(&rates));
            Ok(())
        }
        RateListState::Error(e) => {
            eprintln!("{}", ui::style_text(e.user_message(), ui::StyleType::Error));
            Err(e).context("Failed to load exchange rates")
        }
    }
}

/// Loads rates (refreshing when due) and prints them, optionally filtered.
pub async fn run(service: &RateCacheService, filter: Option<&str>) -> Result<()> {
    let mut view_model = ExchangeRateViewModel::new(service.clone());

    let pb = ui::new_spinner("Loading exchange rates...");
    let mut state = view_model.handle(RateAction::Fetch).await;
    pb.finish_and_clear();

    if let Some(keyword) = filter {
        if matches!(state, RateListState::RatesLoaded(_)) {
            state = view_model
                .handle(RateAction::ApplyFilter(keyword.to_string()))
                .await;
        }
    }

    println!(
        "{}\n",
        ui::style_text("Exchange rates (1 USD)", ui::StyleType::Title)
    );
    let result = display(state);

    service
        .record_screen(LastViewedScreen::ExchangeRateList)
        .await
        .context("Failed to record last viewed screen")?;
    result
}

/// Toggles the favorite flag of `code` and prints the updated list.
pub async fn toggle_favorite(service: &RateCacheService, code: &str) -> Result<()> {
    let code = code.trim().to_uppercase();
    let mut view_model = ExchangeRateViewModel::new(service.clone());

    let state = view_model
        .handle(RateAction::ToggleFavorite(code.clone()))
        .await;
    if let RateListState::RatesLoaded(rates) = &state {
        match rates.iter().find(|r| r.currency_code == code) {
            Some(info) if info.is_favorite => println!("Added {code} to favorites\n"),
            Some(_) => println!("Removed {code} from favorites\n"),
            None => println!(
                "{}\n",
                ui::style_text(
                    &format!("{code} is not in the cached rates"),
                    ui::StyleType::Error
                )
            ),
        }
    }
    display(state)
}
