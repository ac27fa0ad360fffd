//! Terminal output for cart summaries and notifications.

use rocketshoes_cart::CartSummary;
use rocketshoes_client::Notification;

pub fn summary_table(summary: &CartSummary) -> String {
    if summary.lines.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = format!(
        "{:>6}  {:<48}  {:>5}  {:>10}  {:>10}\n",
        "ID", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"
    );
    for line in &summary.lines {
        out.push_str(&format!(
            "{:>6}  {:<48}  {:>5}  {:>10.2}  {:>10.2}\n",
            line.product_id.to_string(),
            truncate(&line.name, 48),
            line.amount,
            line.unit_price,
            line.subtotal
        ));
    }
    out.push_str(&format!(
        "{} product(s), {} unit(s), total {:.2}",
        summary.distinct_products, summary.total_units, summary.total
    ));
    out
}

pub fn notifications(items: &[Notification]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
