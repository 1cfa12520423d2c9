//! Product descriptors from add-to-cart markup.
//!
//! Two sources, tried in order:
//! 1. a JSON payload on the trigger (`data-product='{"id":..,"name":..}'`)
//! 2. the enclosing product card: `data-id`, `data-name`, `data-price`,
//!    falling back to the card title text and the first image's `src`
//!
//! Both go through [`normalize`], so price/qty coercion and the required
//! fields are checked in one place.

use oplung_core::CartItemInput;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::config::DomContract;
use crate::dom::DomElement;

/// Extract the product a trigger adds, or `None` if neither source names
/// both an id and a name.
pub fn extract_product<E: DomElement>(trigger: &E, dom: &DomContract) -> Option<CartItemInput> {
    from_payload(trigger, dom).or_else(|| from_card(trigger, dom))
}

fn from_payload<E: DomElement>(trigger: &E, dom: &DomContract) -> Option<CartItemInput> {
    let raw = trigger.attribute(&dom.payload_attribute)?;
    if raw.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => normalize(&value),
        Err(e) => {
            debug!(error = %e, "Malformed product payload, trying card");
            None
        }
    }
}

fn from_card<E: DomElement>(trigger: &E, dom: &DomContract) -> Option<CartItemInput> {
    let card = trigger.closest(&dom.card)?;

    let name = non_blank(card.attribute("data-name")).or_else(|| {
        card.query_selector(&dom.card_title)
            .and_then(|title| non_blank(Some(title.text_content())))
    });
    let img = card
        .query_selector(&dom.card_image)
        .and_then(|img| img.attribute("src"))
        .unwrap_or_default();

    let mut fields = Map::new();
    if let Some(id) = card.attribute("data-id") {
        fields.insert("id".to_string(), json!(id));
    }
    if let Some(name) = name {
        fields.insert("name".to_string(), json!(name));
    }
    fields.insert(
        "price".to_string(),
        json!(card.attribute("data-price").unwrap_or_default()),
    );
    fields.insert("img".to_string(), json!(img));
    fields.insert("qty".to_string(), json!(1));

    normalize(&Value::Object(fields))
}

/// Validate and coerce a raw product object.
///
/// Requires an id (string or number) and a non-blank name. Price becomes a
/// non-negative number (0 when absent or unparseable) and qty at least 1.
#[must_use]
pub fn normalize(raw: &Value) -> Option<CartItemInput> {
    let mut input = CartItemInput::from_json(raw).ok()?;
    let name = non_blank(input.name.take())?;
    input.name = Some(name);
    input.price = Some(input.price.unwrap_or_default());
    input.qty = Some(input.quantity());
    Some(input)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::dom::{MemoryDocument, MemoryElement, ParentNode};

    fn dom() -> DomContract {
        DomContract::default()
    }

    /// A product card around a trigger; `card_attrs` and `button_attrs`
    /// are spliced into the opening tags.
    fn card(card_attrs: &str, button_attrs: &str) -> MemoryElement {
        let doc = MemoryDocument::fragment(&format!(
            r#"<article class="product-card" {card_attrs}>
                 <img src="/img/shirt.jpg" alt="">
                 <h3 class="product-card__title">
                   Áo thun trắng
                 </h3>
                 <button data-add-to-cart {button_attrs}>Thêm vào giỏ</button>
               </article>"#
        ));
        doc.query_selector("[data-add-to-cart]").unwrap()
    }

    #[test]
    fn test_payload_wins_over_card() {
        let trigger = card(
            r#"data-id="card-id""#,
            r#"data-product='{"id":"p1","name":"From JSON","price":99000,"img":"j.jpg"}'"#,
        );

        let item = extract_product(&trigger, &dom()).unwrap();
        assert_eq!(item.id.as_str(), "p1");
        assert_eq!(item.name.as_deref(), Some("From JSON"));
        assert_eq!(item.price, Some(Decimal::from(99_000)));
        assert_eq!(item.img.as_deref(), Some("j.jpg"));
        assert_eq!(item.qty, Some(1));
    }

    #[test]
    fn test_malformed_payload_falls_through_to_card() {
        let trigger = card(
            r#"data-id="sku1" data-price="150000""#,
            r#"data-product="{broken""#,
        );

        let item = extract_product(&trigger, &dom()).unwrap();
        assert_eq!(item.id.as_str(), "sku1");
        assert_eq!(item.name.as_deref(), Some("Áo thun trắng"));
        assert_eq!(item.price, Some(Decimal::from(150_000)));
        assert_eq!(item.img.as_deref(), Some("/img/shirt.jpg"));
    }

    #[test]
    fn test_payload_missing_name_falls_through() {
        let trigger = card(r#"data-id="sku1""#, r#"data-product='{"id":"p1"}'"#);

        let item = extract_product(&trigger, &dom()).unwrap();
        assert_eq!(item.id.as_str(), "sku1");
    }

    #[test]
    fn test_card_data_name_preferred_over_title() {
        let trigger = card(r#"data-id="sku1" data-name="Data Name""#, "");

        let item = extract_product(&trigger, &dom()).unwrap();
        assert_eq!(item.name.as_deref(), Some("Data Name"));
    }

    #[test]
    fn test_card_non_numeric_price_is_zero() {
        let trigger = card(r#"data-id="sku1" data-price="liên hệ""#, "");

        let item = extract_product(&trigger, &dom()).unwrap();
        assert_eq!(item.price, Some(Decimal::ZERO));
    }

    #[test]
    fn test_card_without_id_yields_nothing() {
        let trigger = card("", "");
        assert!(extract_product(&trigger, &dom()).is_none());
    }

    #[test]
    fn test_no_payload_and_no_card_yields_nothing() {
        let doc = MemoryDocument::fragment("<button data-add-to-cart>Mua</button>");
        let trigger = doc.query_selector("button").unwrap();
        assert!(extract_product(&trigger, &dom()).is_none());
    }

    #[test]
    fn test_normalize_coerces() {
        let item = normalize(&json!({"id": 12, "name": " Hat ", "price": "x", "qty": 0})).unwrap();
        assert_eq!(item.id.as_str(), "12");
        assert_eq!(item.name.as_deref(), Some("Hat"));
        assert_eq!(item.price, Some(Decimal::ZERO));
        assert_eq!(item.qty, Some(1));
    }

    #[test]
    fn test_normalize_requires_id_and_name() {
        assert!(normalize(&json!({"name": "Hat"})).is_none());
        assert!(normalize(&json!({"id": "h", "name": "   "})).is_none());
        assert!(normalize(&json!(["h", "Hat"])).is_none());
    }
}
