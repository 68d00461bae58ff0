//! Payload encoding for stored products.
//!
//! Each indexed document carries a JSON copy of its product, returned verbatim
//! on retrieval and decoded back into an equal [`Product`].

use crate::{IndexError, product::Product};

/// Encodes a product into its stored payload.
pub fn encode(product: &Product) -> Result<String, IndexError> {
    serde_json::to_string(product).map_err(|e| IndexError::Payload(e.to_string()))
}

/// Decodes a stored payload back into a product.
pub fn decode(payload: &str) -> Result<Product, IndexError> {
    serde_json::from_str(payload).map_err(|e| IndexError::Payload(e.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payload_preserves_every_field() {
        let product = Product::builder()
            .title("Desk lamp")
            .url("https://shop.example/lamp?id=7&ref=\"home\"")
            .image_url("https://cdn.example/lamp.png")
            .description("Warm light, ünïcödé and\nnewlines")
            .price("0019.900")
            .build()
            .unwrap();

        let decoded = decode(&encode(&product).unwrap()).unwrap();
        assert_eq!(decoded, product);
        assert_eq!(decoded.price(), "0019.900");
    }

    #[test]
    fn corrupt_payload_is_an_error() {
        let err = decode("{not json").unwrap_err();
        assert!(matches!(err, IndexError::Payload(_)));
    }

    #[test]
    fn payload_with_invalid_product_is_an_error() {
        let err = decode(r#"{"title":"t","url":"","image_url":"i","description":"d","price":"1"}"#)
            .unwrap_err();
        assert!(matches!(err, IndexError::Payload(_)));
    }
}
