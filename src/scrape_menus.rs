//! Scrapes every registered dining location concurrently and merges the pages into one week.
use std::{
    fmt::{self, Display, Formatter},
    time::{Duration, Instant},
};

use chrono::NaiveDate;
use futures::future::join_all;
use reqwest::Client;

use crate::{
    fetch::{self, FetchError},
    menu::{dedupe, MenuEntry, SourceId, SourceOutcome, WeeklyMenu},
    parse,
    sources::Source,
};

/// Which sources made it into the last scrape. Operator-facing only.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    succeeded: Vec<(SourceId, usize)>,
    failed: Vec<FetchError>,
}

impl ScrapeReport {
    fn from_outcomes(outcomes: &[SourceOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut report, (source, outcome)| {
                match outcome {
                    Ok(entries) => report.succeeded.push((source.clone(), entries.len())),
                    Err(e) => report.failed.push(e.clone()),
                }
                report
            })
    }

    pub fn succeeded(&self) -> &[(SourceId, usize)] {
        &self.succeeded
    }

    pub fn failed(&self) -> &[FetchError] {
        &self.failed
    }
}

impl Display for ScrapeReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} sources scraped, {} failed",
            self.succeeded.len(),
            self.failed.len()
        )?;
        for (source, count) in &self.succeeded {
            writeln!(f, "  ok     {source}: {count} items")?;
        }
        for e in &self.failed {
            writeln!(f, "  failed {e}")?;
        }
        Ok(())
    }
}

/// Extracted and deduplicated entries of one page.
pub fn menu_from_page(html: &str, source: &SourceId, week_of: NaiveDate) -> Vec<MenuEntry> {
    dedupe(parse::extract(html, source, week_of))
}

pub async fn scrape_source(
    client: &Client,
    source: &Source,
    week_of: NaiveDate,
) -> Result<Vec<MenuEntry>, FetchError> {
    let doc = fetch::fetch(client, source).await?;
    let entries = menu_from_page(doc.html(), source.id(), week_of);
    if entries.is_empty() {
        log::warn!("{}: no menu entries found at {}", source.id(), doc.url());
    }
    Ok(entries)
}

/// Runs every source's pipeline at once and waits for all of them. A source still running when
/// `deadline` passes is dropped and reported as cancelled; the rest are merged regardless.
pub async fn scrape_week(
    client: &Client,
    sources: &[Source],
    week_of: NaiveDate,
    deadline: Duration,
) -> (WeeklyMenu, ScrapeReport) {
    let start = Instant::now();
    let outcomes: Vec<SourceOutcome> = join_all(sources.iter().map(|source| async move {
        let outcome = tokio::time::timeout(deadline, scrape_source(client, source, week_of))
            .await
            .unwrap_or_else(|_elapsed| {
                let err = FetchError::cancelled(source);
                log::error!("{err}");
                Err(err)
            });
        (source.id().clone(), outcome)
    }))
    .await;

    let report = ScrapeReport::from_outcomes(&outcomes);
    let menu = WeeklyMenu::aggregate(week_of, outcomes);
    log::info!(
        "Scraped the week of {week_of} in {:?}: {}",
        start.elapsed(),
        report.to_string().trim_end()
    );
    (menu, report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::{http::StatusCode, routing::get, Router};
    use chrono::Duration as Days;
    use serde_json::json;

    use super::*;
    use crate::{
        fetch::{make_client, FetchFailure},
        menu::MealPeriod,
        sources::Fallback,
        test_server,
    };

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 8).unwrap()
    }

    fn read(name: &str) -> String {
        fs::read_to_string(format!("./src/parse/html_examples/{name}")).unwrap()
    }

    fn source(addr: std::net::SocketAddr, name: &str, path: &str) -> Source {
        let url = format!("http://{addr}{path}").parse().unwrap();
        Source::new(SourceId::new(name), url, Some(Fallback::default()))
    }

    fn client() -> Client {
        make_client(std::time::Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_lunch_and_dinner_example() {
        let north = SourceId::new("North Servery");
        let entries = menu_from_page(&read("lunch_and_dinner.html"), &north, monday());
        let menu = WeeklyMenu::aggregate(monday(), [(north.clone(), Ok(entries))]);
        assert_eq!(
            serde_json::to_value(&menu).unwrap(),
            json!({
                "week_of": "2024-04-08",
                "days": {
                    "2024-04-08": {
                        "LUNCH": {
                            "North Servery": [{
                                "source": "North Servery",
                                "date": "2024-04-08",
                                "meal_period": "LUNCH",
                                "name": "Pasta",
                                "dietary_tags": ["Gluten"],
                            }]
                        },
                        "DINNER": {
                            "North Servery": [{
                                "source": "North Servery",
                                "date": "2024-04-08",
                                "meal_period": "DINNER",
                                "name": "Salmon",
                                "dietary_tags": ["Fish"],
                            }]
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_spacing_variants_are_not_merged() {
        let page = r#"<section class="meal-section">
              <h2 class="meal-day">Monday</h2><h3 class="meal-period">Lunch</h3>
              <a class="mitem"><div class="mname">Mac  and Cheese</div></a>
              <a class="mitem"><div class="mname">Mac and Cheese</div></a>
              <a class="mitem"><div class="mname"> Mac and Cheese </div></a>
            </section>"#;
        let entries = menu_from_page(page, &SourceId::new("South Servery"), monday());
        let names: Vec<_> = entries.iter().map(MenuEntry::name).collect();
        assert_eq!(names, vec!["Mac  and Cheese", "Mac and Cheese"]);
    }

    #[test]
    fn test_dates_follow_the_calendar() {
        let west = SourceId::new("West Servery");
        let entries = menu_from_page(&read("unordered_days.html"), &west, monday());
        let input_order: Vec<_> = entries.iter().map(MenuEntry::date).collect();
        assert_eq!(
            input_order,
            vec![monday() + Days::days(2), monday(), monday() + Days::days(4)]
        );

        let menu = WeeklyMenu::aggregate(monday(), [(west, Ok(entries))]);
        let weekdays: Vec<_> = menu.dates().map(|d| d.format("%A").to_string()).collect();
        assert_eq!(weekdays, vec!["Monday", "Wednesday", "Friday"]);

        let json = serde_json::to_string(&menu).unwrap();
        let monday_at = json.find("2024-04-08").unwrap();
        let wednesday_at = json.find("2024-04-10").unwrap();
        let friday_at = json.find("2024-04-12").unwrap();
        assert!(monday_at < wednesday_at && wednesday_at < friday_at);
    }

    #[test]
    fn test_deterministic_output() {
        let pages = [
            ("Seibel Servery", read("daily_stations.html")),
            ("Baker Servery", read("weekly_grid.html")),
            ("North Servery", read("lunch_and_dinner.html")),
            ("West Servery", read("unordered_days.html")),
        ];
        let run = |reverse: bool| {
            let mut outcomes: Vec<SourceOutcome> = pages
                .iter()
                .map(|(name, html)| {
                    let id = SourceId::new(*name);
                    let entries = menu_from_page(html, &id, monday());
                    (id, Ok(entries))
                })
                .collect();
            if reverse {
                outcomes.reverse();
            }
            serde_json::to_string(&WeeklyMenu::aggregate(monday(), outcomes)).unwrap()
        };
        let first = run(false);
        assert_eq!(first, run(false));
        assert_eq!(first, run(true));
    }

    #[tokio::test]
    async fn test_partial_failure() {
        let page = read("lunch_and_dinner.html");
        let app = Router::new()
            .route("/seibel", get(move || std::future::ready(page.clone())))
            .route("/baker", get(|| async { read("weekly_grid.html") }))
            .route("/west", get(|| async { read("unordered_days.html") }))
            .route("/south", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/north", get(|| async { StatusCode::NOT_FOUND }));
        let addr = test_server::serve(app).await;
        let sources = [
            source(addr, "Seibel Servery", "/seibel"),
            source(addr, "Baker Servery", "/baker"),
            source(addr, "South Servery", "/south"),
            source(addr, "North Servery", "/north"),
            source(addr, "West Servery", "/west"),
        ];

        let (menu, report) =
            scrape_week(&client(), &sources, monday(), std::time::Duration::from_secs(10)).await;

        let served: Vec<_> = menu.sources().into_iter().map(SourceId::as_str).collect();
        assert_eq!(served, vec!["Baker Servery", "Seibel Servery", "West Servery"]);
        assert_eq!(report.succeeded().len(), 3);
        let failed: Vec<_> = report
            .failed()
            .iter()
            .map(|e| (e.source().as_str(), e.failure().clone()))
            .collect();
        assert_eq!(
            failed,
            vec![
                ("South Servery", FetchFailure::Status(500)),
                ("North Servery", FetchFailure::Status(404)),
            ]
        );
        let seibel_lunch = menu
            .get(monday(), MealPeriod::Lunch, &SourceId::new("Seibel Servery"))
            .unwrap();
        assert_eq!(seibel_lunch.len(), 1);
    }

    #[tokio::test]
    async fn test_same_dish_at_two_locations() {
        let app = Router::new()
            .route("/a", get(|| async { read("lunch_and_dinner.html") }))
            .route("/b", get(|| async { read("lunch_and_dinner.html") }));
        let addr = test_server::serve(app).await;
        let sources = [source(addr, "A", "/a"), source(addr, "B", "/b")];
        let (menu, _) =
            scrape_week(&client(), &sources, monday(), std::time::Duration::from_secs(10)).await;
        for name in ["A", "B"] {
            let dinner = menu
                .get(monday(), MealPeriod::Dinner, &SourceId::new(name))
                .unwrap();
            assert_eq!(dinner.len(), 1);
            assert_eq!(dinner[0].name(), "Salmon");
        }
    }

    #[tokio::test]
    async fn test_slow_source_is_cancelled_at_deadline() {
        let app = Router::new()
            .route("/fast", get(|| async { read("lunch_and_dinner.html") }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                    read("weekly_grid.html")
                }),
            );
        let addr = test_server::serve(app).await;
        let sources = [source(addr, "Fast", "/fast"), source(addr, "Slow", "/slow")];
        let (menu, report) = scrape_week(
            &client(),
            &sources,
            monday(),
            std::time::Duration::from_millis(500),
        )
        .await;
        let served: Vec<_> = menu.sources().into_iter().map(SourceId::as_str).collect();
        assert_eq!(served, vec!["Fast"]);
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.failed()[0].failure(), &FetchFailure::Cancelled);
    }
}
