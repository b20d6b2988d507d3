//! Product Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{Findable, Money, iso::Currency};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{Product, ProductId, VendorId},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Owning vendor id
    pub vendor: String,

    /// Display title
    pub title: String,

    /// Product price (e.g., "2.99 GBP")
    pub price: String,

    /// Compare-at price, when the listing is discounted
    #[serde(default)]
    pub compare_at: Option<String>,

    /// Hosted image reference
    #[serde(default)]
    pub image: Option<String>,

    /// Search tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductFixture {
    /// Convert to a [`Product`], using the map key as the backend id.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be parsed.
    pub fn into_product(self, id: &str) -> Result<Product<'static>, FixtureError> {
        let (minor_units, currency) = parse_price(&self.price)?;

        let compare_at_price = self
            .compare_at
            .as_deref()
            .map(parse_price)
            .transpose()?
            .map(|(minor, compare_currency)| {
                if compare_currency == currency {
                    Ok(Money::from_minor(minor, compare_currency))
                } else {
                    Err(FixtureError::CurrencyMismatch(
                        currency.iso_alpha_code.to_string(),
                        compare_currency.iso_alpha_code.to_string(),
                    ))
                }
            })
            .transpose()?;

        Ok(Product {
            id: ProductId::from(id),
            vendor: VendorId::from(self.vendor),
            title: self.title,
            price: Money::from_minor(minor_units, currency),
            compare_at_price,
            image: self.image,
            tags: self.tags,
        })
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = Currency::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, GBP, USD};

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_usd_and_eur() -> Result<(), FixtureError> {
        let (usd_minor, usd) = parse_price("1.00 USD")?;
        let (eur_minor, eur) = parse_price("2.50 EUR")?;

        assert_eq!(usd_minor, 100);
        assert_eq!(usd, USD);
        assert_eq!(eur_minor, 250);
        assert_eq!(eur, EUR);

        Ok(())
    }

    #[test]
    fn into_product_carries_compare_at_price() -> Result<(), FixtureError> {
        let fixture = ProductFixture {
            vendor: "v-1".to_owned(),
            title: "Honey".to_owned(),
            price: "4.50 GBP".to_owned(),
            compare_at: Some("5.00 GBP".to_owned()),
            image: None,
            tags: vec![],
        };

        let product = fixture.into_product("p-honey")?;

        assert_eq!(product.id.as_str(), "p-honey");
        assert_eq!(product.price, Money::from_minor(450, GBP));
        assert!(product.on_sale());

        Ok(())
    }

    #[test]
    fn into_product_rejects_mixed_currency_compare_at() {
        let fixture = ProductFixture {
            vendor: "v-1".to_owned(),
            title: "Honey".to_owned(),
            price: "4.50 GBP".to_owned(),
            compare_at: Some("5.00 USD".to_owned()),
            image: None,
            tags: vec![],
        };

        let result = fixture.into_product("p-honey");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));
    }
}
