//! Corporate-event feed for the calendar topic

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventKind {
    Earnings,
    ExDividend,
    DividendPayment,
}

/// One upcoming corporate event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub symbol: String,
    pub kind: CalendarEventKind,
    pub date: DateTime<Utc>,
}

/// Client for the vendor calendar-events endpoint
pub struct CalendarClient {
    client: Client,
    base_url: String,
}

impl CalendarClient {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: QUOTE_SUMMARY_URL.to_string(),
        }
    }

    pub async fn fetch_events(&self, symbol: &str) -> anyhow::Result<Vec<CalendarEvent>> {
        let url = format!("{}/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("modules", "calendarEvents")])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("calendar endpoint returned status {}", response.status());
        }

        let body: SummaryResponse = response.json().await?;
        Ok(convert_events(body, symbol))
    }
}

fn convert_events(body: SummaryResponse, symbol: &str) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    let Some(calendar) = body
        .quote_summary
        .result
        .into_iter()
        .next()
        .and_then(|r| r.calendar_events)
    else {
        return events;
    };

    if let Some(earnings) = calendar.earnings {
        for stamp in earnings.earnings_date {
            if let Some(date) = timestamp(stamp.raw) {
                events.push(CalendarEvent {
                    symbol: symbol.to_string(),
                    kind: CalendarEventKind::Earnings,
                    date,
                });
            }
        }
    }

    if let Some(date) = calendar.ex_dividend_date.and_then(|s| timestamp(s.raw)) {
        events.push(CalendarEvent {
            symbol: symbol.to_string(),
            kind: CalendarEventKind::ExDividend,
            date,
        });
    }

    if let Some(date) = calendar.dividend_date.and_then(|s| timestamp(s.raw)) {
        events.push(CalendarEvent {
            symbol: symbol.to_string(),
            kind: CalendarEventKind::DividendPayment,
            date,
        });
    }

    events
}

fn timestamp(raw: Option<i64>) -> Option<DateTime<Utc>> {
    raw.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    result: Vec<SummaryResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    calendar_events: Option<RawCalendar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCalendar {
    earnings: Option<RawEarnings>,
    ex_dividend_date: Option<RawStamp>,
    dividend_date: Option<RawStamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEarnings {
    #[serde(default)]
    earnings_date: Vec<RawStamp>,
}

#[derive(Debug, Deserialize)]
struct RawStamp {
    raw: Option<i64>,
}
