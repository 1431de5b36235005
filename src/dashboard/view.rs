//! HTML rendering
//!
//! The page is self-contained: charts are inline SVG, no scripts.

use super::reader::DashboardData;
use crate::db::PricePoint;
use crate::sentiment::SentimentLabel;
use crate::ticker::Ticker;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::Write;

const PIE_RADIUS: f64 = 80.0;
const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 320.0;
const CHART_PADDING: f64 = 48.0;

/// Inputs for one page render
pub struct PageContext<'a> {
    pub ticker: &'a Ticker,
    pub watchlist: &'a [Ticker],
    pub data: &'a DashboardData,
    pub extracted_on: NaiveDate,
    /// Shown above everything else, e.g. an unknown ticker fallback
    pub notice: Option<&'a str>,
}

pub fn render_page(page: &PageContext<'_>) -> String {
    let ticker = escape(page.ticker.as_str());
    let mut html = String::with_capacity(8 * 1024);

    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Stock Sentiment Dashboard</title>\n<style>\n\
         body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#222}\n\
         .warning{background:#fff4d6;border-left:4px solid #f0ad00;padding:.6rem 1rem;margin:.8rem 0}\n\
         .error{background:#fde2e2;border-left:4px solid #d33;padding:.6rem 1rem;margin:.8rem 0}\n\
         .info{background:#e3f0fc;border-left:4px solid #2a7ae2;padding:.6rem 1rem;margin:.8rem 0}\n\
         table{border-collapse:collapse;width:100%}\n\
         th,td{border:1px solid #ddd;padding:.3rem .6rem;text-align:right}\n\
         th:first-child,td:first-child{text-align:left}\n\
         .columns{display:flex;gap:2rem;flex-wrap:wrap}\n.columns>section{flex:1;min-width:300px}\n\
         </style>\n</head>\n<body>\n<h1>&#128202; Stock Sentiment Dashboard</h1>\n",
    );

    if let Some(notice) = page.notice {
        let _ = writeln!(html, "<div class=\"warning\">{}</div>", escape(notice));
    }
    for err in &page.data.errors {
        let _ = writeln!(html, "<div class=\"error\">{}</div>", escape(err));
    }

    render_selector(&mut html, page.ticker, page.watchlist);

    let _ = writeln!(html, "<h2>Sentiment from NewsAPI for {}</h2>", ticker);
    if page.data.sentiment.is_empty() {
        let _ = writeln!(
            html,
            "<div class=\"warning\">No sentiment data found for {} from NewsAPI.</div>",
            ticker
        );
    } else {
        let _ = writeln!(
            html,
            "<p>Sentiment Data Extracted on: {}</p>",
            page.extracted_on.format("%Y-%m-%d")
        );
        html.push_str(&sentiment_pie(&page.data.sentiment));
    }

    html.push_str("<hr>\n<div class=\"columns\">\n<section>\n");
    let _ = writeln!(html, "<h2>Stock Prices for {}</h2>", ticker);
    if page.data.prices.is_empty() {
        html.push_str("<div class=\"info\">No price data table available.</div>\n");
    } else {
        html.push_str(&price_table(&page.data.prices));
    }
    html.push_str("</section>\n<section>\n<h2>Closing Price Trend</h2>\n");
    if page.data.prices.is_empty() {
        html.push_str("<div class=\"info\">No price trend chart available.</div>\n");
    } else {
        html.push_str(&close_price_chart(&page.data.prices));
    }
    html.push_str("</section>\n</div>\n</body>\n</html>\n");

    html
}

fn render_selector(html: &mut String, selected: &Ticker, watchlist: &[Ticker]) {
    html.push_str(
        "<form method=\"get\" action=\"/\">\n<label for=\"ticker\">Choose a stock:</label>\n\
         <select id=\"ticker\" name=\"ticker\" onchange=\"this.form.submit()\">\n",
    );
    for ticker in watchlist {
        let symbol = escape(ticker.as_str());
        let selected_attr = if ticker == selected { " selected" } else { "" };
        let _ = writeln!(html, "<option value=\"{0}\"{1}>{0}</option>", symbol, selected_attr);
    }
    html.push_str("</select>\n<noscript><button type=\"submit\">Show</button></noscript>\n</form>\n");
}

fn label_color(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "#2ca02c",
        SentimentLabel::Negative => "#d62728",
        SentimentLabel::Neutral => "#7f7f7f",
    }
}

/// Pie chart of label shares with percentage labels
pub fn sentiment_pie(counts: &BTreeMap<SentimentLabel, i64>) -> String {
    let total: i64 = counts.values().sum();
    let size = PIE_RADIUS * 2.0 + 160.0;
    let (cx, cy) = (size / 2.0, PIE_RADIUS + 20.0);
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg class=\"pie\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" role=\"img\">",
        w = size,
        h = PIE_RADIUS * 2.0 + 40.0
    );

    if total <= 0 {
        svg.push_str("</svg>\n");
        return svg;
    }

    let mut start = -PI / 2.0;
    for (label, count) in counts.iter().filter(|(_, c)| **c > 0) {
        let share = *count as f64 / total as f64;
        let sweep = share * 2.0 * PI;
        let end = start + sweep;

        if share >= 1.0 {
            let _ = writeln!(
                svg,
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
                cx,
                cy,
                PIE_RADIUS,
                label_color(*label)
            );
        } else {
            let (x1, y1) = (cx + PIE_RADIUS * start.cos(), cy + PIE_RADIUS * start.sin());
            let (x2, y2) = (cx + PIE_RADIUS * end.cos(), cy + PIE_RADIUS * end.sin());
            let large_arc = if sweep > PI { 1 } else { 0 };
            let _ = writeln!(
                svg,
                "<path d=\"M{:.2},{:.2} L{:.2},{:.2} A{r:.2},{r:.2} 0 {} 1 {:.2},{:.2} Z\" fill=\"{}\"/>",
                cx,
                cy,
                x1,
                y1,
                large_arc,
                x2,
                y2,
                label_color(*label),
                r = PIE_RADIUS
            );
        }

        let mid = start + sweep / 2.0;
        let (lx, ly) = (
            cx + (PIE_RADIUS + 14.0) * mid.cos(),
            cy + (PIE_RADIUS + 14.0) * mid.sin(),
        );
        let anchor = if mid.cos() >= 0.0 { "start" } else { "end" };
        let _ = writeln!(
            svg,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-size=\"12\">{} {:.1}%</text>",
            lx,
            ly,
            anchor,
            label,
            share * 100.0
        );

        start = end;
    }

    svg.push_str("</svg>\n");
    svg
}

/// Table of the stored OHLC columns
pub fn price_table(prices: &[PricePoint]) -> String {
    let mut table = String::from(
        "<table>\n<thead><tr><th>price_date</th><th>open_price</th><th>high_price</th>\
         <th>low_price</th><th>close_price</th></tr></thead>\n<tbody>\n",
    );
    for p in prices {
        let _ = writeln!(
            table,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
            p.price_date.format("%Y-%m-%d"),
            p.open_price,
            p.high_price,
            p.low_price,
            p.close_price
        );
    }
    table.push_str("</tbody>\n</table>\n");
    table
}

/// Line chart of close prices with point markers and a light grid
pub fn close_price_chart(prices: &[PricePoint]) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg class=\"trend\" width=\"100%\" viewBox=\"0 0 {} {}\" role=\"img\">",
        CHART_WIDTH, CHART_HEIGHT
    );

    let (min, max) = prices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.close_price), hi.max(p.close_price))
    });
    if !min.is_finite() || !max.is_finite() {
        svg.push_str("</svg>\n");
        return svg;
    }
    let (min, max) = if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    };

    let plot_w = CHART_WIDTH - 2.0 * CHART_PADDING;
    let plot_h = CHART_HEIGHT - 2.0 * CHART_PADDING;
    let x_at = |i: usize| {
        if prices.len() == 1 {
            CHART_PADDING + plot_w / 2.0
        } else {
            CHART_PADDING + plot_w * i as f64 / (prices.len() - 1) as f64
        }
    };
    let y_at = |v: f64| CHART_PADDING + plot_h * (1.0 - (v - min) / (max - min));

    for step in 0..=4 {
        let value = min + (max - min) * step as f64 / 4.0;
        let y = y_at(value);
        let _ = writeln!(
            svg,
            "<line x1=\"{:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"#e5e5e5\"/>\
             <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-size=\"10\">{:.2}</text>",
            CHART_PADDING,
            CHART_WIDTH - CHART_PADDING,
            CHART_PADDING - 6.0,
            y + 3.0,
            value,
            y = y
        );
    }

    let points: Vec<String> = prices
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.2},{:.2}", x_at(i), y_at(p.close_price)))
        .collect();
    let _ = writeln!(
        svg,
        "<polyline fill=\"none\" stroke=\"#1f4fd1\" stroke-width=\"2\" points=\"{}\"/>",
        points.join(" ")
    );

    for (i, p) in prices.iter().enumerate() {
        let _ = writeln!(
            svg,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"3.5\" fill=\"#1f4fd1\"><title>{} {:.2}</title></circle>\
             <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"10\">{}</text>",
            x_at(i),
            y_at(p.close_price),
            p.price_date.format("%Y-%m-%d"),
            p.close_price,
            x_at(i),
            CHART_HEIGHT - CHART_PADDING + 16.0,
            p.price_date.format("%m-%d")
        );
    }

    let _ = writeln!(
        svg,
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\">Date</text>\
         <text x=\"12\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\" \
         transform=\"rotate(-90 12 {:.2})\">Close Price</text>",
        CHART_WIDTH / 2.0,
        CHART_HEIGHT - 8.0,
        CHART_HEIGHT / 2.0,
        CHART_HEIGHT / 2.0
    );

    svg.push_str("</svg>\n");
    svg
}

/// Minimal HTML escaping for text and attribute values
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, close: f64) -> PricePoint {
        PricePoint {
            price_date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            open_price: close,
            high_price: close,
            low_price: close,
            close_price: close,
        }
    }

    fn render(data: &DashboardData, notice: Option<&str>) -> String {
        let watchlist = Ticker::watchlist();
        render_page(&PageContext {
            ticker: &watchlist[1],
            watchlist: &watchlist,
            data,
            extracted_on: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
            notice,
        })
    }

    #[test]
    fn test_empty_page_shows_placeholders() {
        let html = render(&DashboardData::default(), None);
        assert!(html.contains("No sentiment data found for NVDA from NewsAPI."));
        assert!(html.contains("No price data table available."));
        assert!(html.contains("No price trend chart available."));
        assert!(!html.contains("Sentiment Data Extracted on"));
        assert!(html.contains("<option value=\"NVDA\" selected>NVDA</option>"));
    }

    #[test]
    fn test_populated_page() {
        let data = DashboardData {
            sentiment: BTreeMap::from([(SentimentLabel::Positive, 3), (SentimentLabel::Negative, 1)]),
            prices: vec![point(6, 140.5), point(7, 138.25)],
            errors: Vec::new(),
        };
        let html = render(&data, None);
        assert!(html.contains("Sentiment Data Extracted on: 2025-01-09"));
        assert!(html.contains("Positive 75.0%"));
        assert!(html.contains("Negative 25.0%"));
        assert!(html.contains("<td>2025-01-07</td><td>138.25</td>"));
        assert!(html.contains("<polyline"));
        assert!(!html.contains("No price data table available."));
    }

    #[test]
    fn test_errors_and_notice_render_with_rest_of_page() {
        let data = DashboardData {
            errors: vec!["Price DB Error: unable to open <db>".to_string()],
            ..Default::default()
        };
        let html = render(&data, Some("Unknown ticker"));
        assert!(html.contains("<div class=\"error\">Price DB Error: unable to open &lt;db&gt;</div>"));
        assert!(html.contains("<div class=\"warning\">Unknown ticker</div>"));
        assert!(html.contains("No price trend chart available."));
    }

    #[test]
    fn test_single_label_pie_is_full_circle() {
        let svg = sentiment_pie(&BTreeMap::from([(SentimentLabel::Neutral, 4)]));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("Neutral 100.0%"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_flat_series_chart() {
        let svg = close_price_chart(&[point(6, 10.0), point(7, 10.0)]);
        assert!(!svg.contains("NaN"));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
