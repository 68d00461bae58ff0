//! The product record stored in and returned from the repository.
//!
//! A [`Product`] can only be constructed through [`ProductBuilder`] or a
//! validating deserializer, so every instance has all five fields and a price
//! that parses as a decimal number. The price keeps its original text so that a
//! product read back from the index is equal to the one written.

use serde::{Deserialize, Serialize};

use crate::{IndexError, document::MAX_URL_LEN};

/// A product record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ProductFields")]
pub struct Product {
    /// Product title, indexed for search.
    title: String,
    /// Product page URL; the identity of the product within a shard.
    url: String,
    /// Product image URL.
    image_url: String,
    /// Product description, indexed for search.
    description: String,
    /// Price as decimal text, e.g. `"10.00"`.
    price: String,
}

impl Product {
    /// Returns a builder for a new product.
    pub fn builder() -> ProductBuilder {
        ProductBuilder::default()
    }

    /// Product title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Product page URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Product image URL.
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Product description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Price as the decimal text it was created with.
    pub fn price(&self) -> &str {
        &self.price
    }

    /// Price as a number.
    pub fn price_value(&self) -> Result<f64, IndexError> {
        parse_price(&self.price)
    }
}

/// Builder for [`Product`] requiring every field.
#[derive(Debug, Clone, Default)]
pub struct ProductBuilder {
    /// Pending title.
    title: Option<String>,
    /// Pending URL.
    url: Option<String>,
    /// Pending image URL.
    image_url: Option<String>,
    /// Pending description.
    description: Option<String>,
    /// Pending price text.
    price: Option<String>,
}

impl ProductBuilder {
    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the image URL.
    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the price from its decimal text.
    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    /// Validates the fields and builds the product.
    ///
    /// Fails with [`IndexError::InvalidProduct`] when a field is missing, the
    /// URL is empty, or the price is not a decimal number.
    pub fn build(self) -> Result<Product, IndexError> {
        let url = require("url", self.url)?;
        if url.is_empty() {
            return Err(IndexError::invalid_product("url", "must not be empty"));
        }
        if url.len() > MAX_URL_LEN {
            return Err(IndexError::invalid_product(
                "url",
                format!("{} bytes exceeds the {MAX_URL_LEN} byte limit", url.len()),
            ));
        }
        let price = require("price", self.price)?;
        parse_price(&price)?;

        Ok(Product {
            title: require("title", self.title)?,
            url,
            image_url: require("image_url", self.image_url)?,
            description: require("description", self.description)?,
            price,
        })
    }
}

/// Returns the field value or a missing-field error.
fn require(field: &'static str, value: Option<String>) -> Result<String, IndexError> {
    value.ok_or_else(|| IndexError::invalid_product(field, "missing"))
}

/// Parses decimal price text.
///
/// Accepts an optional sign, ASCII digits and an optional fractional part, with
/// at least one digit overall. Exponents, `inf`, `NaN` and the like are rejected.
pub fn parse_price(text: &str) -> Result<f64, IndexError> {
    let invalid =
        || IndexError::invalid_product("price", format!("'{text}' is not a decimal number"));

    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.len() + fraction.len() == 0 || !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid());
    }

    trimmed.parse::<f64>().map_err(|_| invalid())
}

/// Unvalidated product fields as they appear in serialized form.
#[derive(Deserialize)]
struct ProductFields {
    /// Title.
    title: Option<String>,
    /// URL.
    url: Option<String>,
    /// Image URL.
    image_url: Option<String>,
    /// Description.
    description: Option<String>,
    /// Price text.
    price: Option<String>,
}

impl TryFrom<ProductFields> for Product {
    type Error = IndexError;

    fn try_from(fields: ProductFields) -> Result<Self, Self::Error> {
        ProductBuilder {
            title: fields.title,
            url: fields.url,
            image_url: fields.image_url,
            description: fields.description,
            price: fields.price,
        }
        .build()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> ProductBuilder {
        Product::builder()
            .title("prodict title")
            .url("product url")
            .image_url("product image url")
            .description("product desc")
            .price("10.00")
    }

    #[test]
    fn builds_with_all_fields() {
        let product = sample().build().unwrap();
        assert_eq!(product.title(), "prodict title");
        assert_eq!(product.url(), "product url");
        assert_eq!(product.image_url(), "product image url");
        assert_eq!(product.description(), "product desc");
        assert_eq!(product.price(), "10.00");
        assert!((product.price_value().unwrap() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = Product::builder()
            .title("t")
            .url("u")
            .description("d")
            .price("1")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            IndexError::InvalidProduct {
                field: "image_url",
                ..
            }
        ));
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = sample().url("").build().unwrap_err();
        assert!(matches!(err, IndexError::InvalidProduct { field: "url", .. }));
    }

    #[test]
    fn overlong_url_is_rejected() {
        let err = sample().url("u".repeat(70_000)).build().unwrap_err();
        assert!(matches!(err, IndexError::InvalidProduct { field: "url", .. }));

        assert!(sample().url("u".repeat(MAX_URL_LEN)).build().is_ok());
        assert!(sample().url("u".repeat(MAX_URL_LEN + 1)).build().is_err());
    }

    #[test]
    fn malformed_price_is_rejected() {
        for bad in ["", "abc", "1e5", "inf", "NaN", "1.2.3", "12,50", ".", "-", "0x10"] {
            let err = sample().price(bad).build().unwrap_err();
            assert!(
                matches!(err, IndexError::InvalidProduct { field: "price", .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn decimal_prices_are_accepted() {
        for (text, value) in [
            ("10.00", 10.0),
            ("45", 45.0),
            (".5", 0.5),
            ("3.", 3.0),
            (" 7.25 ", 7.25),
            ("-1.5", -1.5),
            ("+2", 2.0),
        ] {
            let parsed = parse_price(text).unwrap();
            assert!((parsed - value).abs() < f64::EPSILON, "{text:?}");
        }
    }

    #[test]
    fn equality_is_field_by_field() {
        let a = sample().build().unwrap();
        let b = sample().build().unwrap();
        let c = sample().description("other desc").build().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn deserialize_validates() {
        let json = r#"{"title":"t","url":"u","image_url":"i","description":"d","price":"oops"}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());

        let json = r#"{"title":"t","url":"u","image_url":"i","description":"d"}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());

        let json = r#"{"title":"t","url":"u","image_url":"i","description":"d","price":"3.50"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price(), "3.50");
    }
}
