use crate::api::AppState;
use crate::error::PredictionError;
use crate::models::{PredictionResult, StartupRecord, MAX_YEAR_FOUNDED, MIN_YEAR_FOUNDED};
use axum::{
    extract::{Form, State},
    response::Html,
};
use serde::Deserialize;
use std::str::FromStr;

/// Raw form submission; every field arrives as text and is parsed explicitly
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictionForm {
    pub industry: String,
    pub region: String,
    pub funding_rounds: String,
    pub funding_amount: String,
    pub valuation: String,
    pub revenue: String,
    pub employees: String,
    pub market_share: String,
    pub year_founded: String,
}

impl Default for PredictionForm {
    fn default() -> Self {
        Self {
            industry: String::new(),
            region: String::new(),
            funding_rounds: "1".to_string(),
            funding_amount: "0.0".to_string(),
            valuation: "0.0".to_string(),
            revenue: "0.0".to_string(),
            employees: "1".to_string(),
            market_share: "0.0".to_string(),
            year_founded: "2020".to_string(),
        }
    }
}

impl PredictionForm {
    /// Parse the submitted text into a record. Bounds are checked by the adapter.
    pub fn to_record(&self) -> Result<StartupRecord, PredictionError> {
        Ok(StartupRecord {
            industry: self.industry.trim().to_string(),
            region: self.region.trim().to_string(),
            funding_rounds: parse_field("Funding Rounds", &self.funding_rounds)?,
            funding_amount: parse_field("Funding Amount", &self.funding_amount)?,
            valuation: parse_field("Valuation", &self.valuation)?,
            revenue: parse_field("Revenue", &self.revenue)?,
            employees: parse_field("Number of Employees", &self.employees)?,
            market_share: parse_field("Market Share", &self.market_share)?,
            year_founded: parse_field("Year Founded", &self.year_founded)?,
        })
    }
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> Result<T, PredictionError> {
    let raw = raw.trim();
    raw.parse().map_err(|_| {
        PredictionError::InvalidInput(format!("{} must be a number, got '{}'", name, raw))
    })
}

/// What to show below the form
enum Outcome {
    Empty,
    Prediction(PredictionResult),
    Error(PredictionError),
}

/// Render the empty form
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let mut form = PredictionForm::default();
    form.industry = state.bundle.industries().first().cloned().unwrap_or_default();
    form.region = state.bundle.regions().first().cloned().unwrap_or_default();

    Html(render_page(&state, &form, &Outcome::Empty))
}

/// Handle a form submission and render the result below the form
pub async fn submit(State(state): State<AppState>, Form(form): Form<PredictionForm>) -> Html<String> {
    let outcome = match form
        .to_record()
        .map_err(|e| state.reject(e))
        .and_then(|record| state.predict(&record))
    {
        Ok(result) => Outcome::Prediction(result),
        Err(e) => Outcome::Error(e),
    };

    Html(render_page(&state, &form, &outcome))
}

fn render_page(state: &AppState, form: &PredictionForm, outcome: &Outcome) -> String {
    let outcome_html = match outcome {
        Outcome::Empty => String::new(),
        Outcome::Prediction(result) => format!(
            r#"<div class="result {}">
        <h2>Prediction: {}</h2>
        <p>Probability of being profitable: {}</p>
    </div>"#,
            if result.label.is_profitable() { "profitable" } else { "not-profitable" },
            result.label,
            result.probability_display()
        ),
        Outcome::Error(e) => format!(
            r#"<div class="error">Error: {}</div>"#,
            escape_html(&e.to_string())
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Startup Profitability Predictor</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
            max-width: 640px;
            margin: 0 auto;
            padding: 20px;
            color: #333;
        }}
        label {{
            display: block;
            margin-top: 12px;
            font-weight: bold;
        }}
        input, select {{
            width: 100%;
            padding: 6px;
            box-sizing: border-box;
        }}
        button {{
            margin-top: 20px;
            padding: 8px 24px;
        }}
        .result, .error {{
            margin-top: 24px;
            padding: 15px;
            border-radius: 5px;
        }}
        .profitable {{ background-color: #e6f4ea; border-left: 4px solid #2e7d32; }}
        .not-profitable {{ background-color: #fdecea; border-left: 4px solid #c62828; }}
        .error {{ background-color: #fff4e5; border-left: 4px solid #ef6c00; }}
    </style>
</head>
<body>
    <h1>Startup Profitability Predictor</h1>
    <p>Enter startup details to predict if the startup is profitable.</p>
    <form method="post" action="/predict">
        <label for="industry">Industry</label>
        <select id="industry" name="industry">{industry_options}</select>
        <label for="region">Region</label>
        <select id="region" name="region">{region_options}</select>
        <label for="funding_rounds">Funding Rounds</label>
        <input id="funding_rounds" name="funding_rounds" type="number" min="0" step="1" value="{funding_rounds}">
        <label for="funding_amount">Funding Amount (M USD)</label>
        <input id="funding_amount" name="funding_amount" type="number" min="0" step="any" value="{funding_amount}">
        <label for="valuation">Valuation (M USD)</label>
        <input id="valuation" name="valuation" type="number" min="0" step="any" value="{valuation}">
        <label for="revenue">Revenue (M USD)</label>
        <input id="revenue" name="revenue" type="number" min="0" step="any" value="{revenue}">
        <label for="employees">Number of Employees</label>
        <input id="employees" name="employees" type="number" min="1" step="1" value="{employees}">
        <label for="market_share">Market Share (%)</label>
        <input id="market_share" name="market_share" type="number" min="0" max="100" step="any" value="{market_share}">
        <label for="year_founded">Year Founded</label>
        <input id="year_founded" name="year_founded" type="number" min="{min_year}" max="{max_year}" step="1" value="{year_founded}">
        <button type="submit">Predict</button>
    </form>
    {outcome_html}
</body>
</html>"#,
        industry_options = render_options(state.bundle.industries(), &form.industry),
        region_options = render_options(state.bundle.regions(), &form.region),
        funding_rounds = escape_html(&form.funding_rounds),
        funding_amount = escape_html(&form.funding_amount),
        valuation = escape_html(&form.valuation),
        revenue = escape_html(&form.revenue),
        employees = escape_html(&form.employees),
        market_share = escape_html(&form.market_share),
        min_year = MIN_YEAR_FOUNDED,
        max_year = MAX_YEAR_FOUNDED,
        year_founded = escape_html(&form.year_founded),
        outcome_html = outcome_html,
    )
}

fn render_options(labels: &[String], selected: &str) -> String {
    labels
        .iter()
        .map(|label| {
            let escaped = escape_html(label);
            let marker = if label == selected { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{}</option>"#, escaped, marker, escaped)
        })
        .collect()
}

/// Escape HTML special characters
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
