//! Static currency catalog used by selectors and for seeding defaults.

use serde::Serialize;
use std::fmt;

use crate::currency::Currency;
use crate::error::{CommonError, Result};

/// Display metadata for a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// ISO 4217 code.
    pub code: &'static str,
    /// English display name.
    pub name: &'static str,
    /// Flag emoji.
    pub flag: &'static str,
    /// Currency symbol; the code itself where no distinct sign is used.
    pub symbol: &'static str,
}

impl CatalogEntry {
    const fn new(
        code: &'static str,
        name: &'static str,
        flag: &'static str,
        symbol: &'static str,
    ) -> Self {
        Self {
            code,
            name,
            flag,
            symbol,
        }
    }

    /// The currency code as a [`Currency`].
    pub fn currency(&self) -> Currency {
        Currency::new(self.code)
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.flag, self.name, self.code)
    }
}

impl From<&CatalogEntry> for Currency {
    fn from(entry: &CatalogEntry) -> Self {
        entry.currency()
    }
}

impl From<CatalogEntry> for Currency {
    fn from(entry: CatalogEntry) -> Self {
        entry.currency()
    }
}

// Major currencies first, then by region.
static CURRENCIES: &[CatalogEntry] = &[
    CatalogEntry::new("USD", "US Dollar", "🇺🇸", "$"),
    CatalogEntry::new("EUR", "Euro", "🇪🇺", "€"),
    CatalogEntry::new("GBP", "British Pound", "🇬🇧", "£"),
    CatalogEntry::new("JPY", "Japanese Yen", "🇯🇵", "¥"),
    CatalogEntry::new("CHF", "Swiss Franc", "🇨🇭", "CHF"),
    CatalogEntry::new("CAD", "Canadian Dollar", "🇨🇦", "C$"),
    CatalogEntry::new("AUD", "Australian Dollar", "🇦🇺", "A$"),
    CatalogEntry::new("CNY", "Chinese Yuan", "🇨🇳", "¥"),
    CatalogEntry::new("INR", "Indian Rupee", "🇮🇳", "₹"),
    CatalogEntry::new("KRW", "South Korean Won", "🇰🇷", "₩"),
    CatalogEntry::new("SGD", "Singapore Dollar", "🇸🇬", "S$"),
    CatalogEntry::new("HKD", "Hong Kong Dollar", "🇭🇰", "HK$"),
    CatalogEntry::new("SEK", "Swedish Krona", "🇸🇪", "kr"),
    CatalogEntry::new("NOK", "Norwegian Krone", "🇳🇴", "kr"),
    CatalogEntry::new("DKK", "Danish Krone", "🇩🇰", "kr"),
    CatalogEntry::new("PLN", "Polish Złoty", "🇵🇱", "zł"),
    CatalogEntry::new("CZK", "Czech Koruna", "🇨🇿", "Kč"),
    CatalogEntry::new("HUF", "Hungarian Forint", "🇭🇺", "Ft"),
    CatalogEntry::new("TRY", "Turkish Lira", "🇹🇷", "₺"),
    CatalogEntry::new("RUB", "Russian Ruble", "🇷🇺", "₽"),
    CatalogEntry::new("BRL", "Brazilian Real", "🇧🇷", "R$"),
    CatalogEntry::new("MXN", "Mexican Peso", "🇲🇽", "Mex$"),
    CatalogEntry::new("ARS", "Argentine Peso", "🇦🇷", "$"),
    CatalogEntry::new("CLP", "Chilean Peso", "🇨🇱", "$"),
    CatalogEntry::new("COP", "Colombian Peso", "🇨🇴", "$"),
    CatalogEntry::new("PEN", "Peruvian Sol", "🇵🇪", "S/"),
    CatalogEntry::new("ZAR", "South African Rand", "🇿🇦", "R"),
    CatalogEntry::new("EGP", "Egyptian Pound", "🇪🇬", "£"),
    CatalogEntry::new("NGN", "Nigerian Naira", "🇳🇬", "₦"),
    CatalogEntry::new("KES", "Kenyan Shilling", "🇰🇪", "KSh"),
    CatalogEntry::new("MAD", "Moroccan Dirham", "🇲🇦", "DH"),
    CatalogEntry::new("TND", "Tunisian Dinar", "🇹🇳", "DT"),
    CatalogEntry::new("AED", "UAE Dirham", "🇦🇪", "AED"),
    CatalogEntry::new("SAR", "Saudi Riyal", "🇸🇦", "SR"),
    CatalogEntry::new("QAR", "Qatari Riyal", "🇶🇦", "QR"),
    CatalogEntry::new("KWD", "Kuwaiti Dinar", "🇰🇼", "KD"),
    CatalogEntry::new("BHD", "Bahraini Dinar", "🇧🇭", "BD"),
    CatalogEntry::new("OMR", "Omani Rial", "🇴🇲", "OR"),
    CatalogEntry::new("ILS", "Israeli Shekel", "🇮🇱", "₪"),
    CatalogEntry::new("JOD", "Jordanian Dinar", "🇯🇴", "JD"),
    CatalogEntry::new("LBP", "Lebanese Pound", "🇱🇧", "L£"),
    CatalogEntry::new("THB", "Thai Baht", "🇹🇭", "฿"),
    CatalogEntry::new("MYR", "Malaysian Ringgit", "🇲🇾", "RM"),
    CatalogEntry::new("IDR", "Indonesian Rupiah", "🇮🇩", "Rp"),
    CatalogEntry::new("PHP", "Philippine Peso", "🇵🇭", "₱"),
    CatalogEntry::new("VND", "Vietnamese Dong", "🇻🇳", "₫"),
    CatalogEntry::new("PKR", "Pakistani Rupee", "🇵🇰", "₨"),
    CatalogEntry::new("BDT", "Bangladeshi Taka", "🇧🇩", "৳"),
    CatalogEntry::new("LKR", "Sri Lankan Rupee", "🇱🇰", "Rs"),
    CatalogEntry::new("NPR", "Nepalese Rupee", "🇳🇵", "₨"),
    CatalogEntry::new("MMK", "Myanmar Kyat", "🇲🇲", "K"),
    CatalogEntry::new("KHR", "Cambodian Riel", "🇰🇭", "៛"),
    CatalogEntry::new("LAK", "Lao Kip", "🇱🇦", "₭"),
    CatalogEntry::new("NZD", "New Zealand Dollar", "🇳🇿", "NZ$"),
    CatalogEntry::new("FJD", "Fijian Dollar", "🇫🇯", "FJ$"),
    CatalogEntry::new("TOP", "Tongan Paʻanga", "🇹🇴", "T$"),
    CatalogEntry::new("WST", "Samoan Tālā", "🇼🇸", "WS$"),
];

/// All catalog entries, in display order.
pub fn all() -> &'static [CatalogEntry] {
    CURRENCIES
}

/// Default base currency (USD).
pub fn default_base() -> &'static CatalogEntry {
    &CURRENCIES[0]
}

/// Default target currency (EUR).
pub fn default_target() -> &'static CatalogEntry {
    &CURRENCIES[1]
}

/// Look up a catalog entry by code, case-insensitively.
pub fn find_by_code(code: &str) -> Option<&'static CatalogEntry> {
    let code = code.trim();
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Look up a catalog entry by code, failing for unknown codes.
pub fn lookup(code: &str) -> Result<&'static CatalogEntry> {
    find_by_code(code).ok_or_else(|| CommonError::UnknownCurrency(code.to_string()))
}

/// Parse a user-supplied code into a catalog currency.
///
/// Malformed codes fail with `InvalidCurrencyCode`, well-formed codes
/// missing from the catalog with `UnknownCurrency`.
pub fn resolve(code: &str) -> Result<Currency> {
    let currency: Currency = code.parse()?;
    lookup(currency.code())?;
    Ok(currency)
}

/// Render an amount with the currency's symbol and display precision,
/// e.g. `$12.50`, `¥1104` or `CHF 3.20`.
pub fn format_amount(currency: &Currency, amount: f64) -> String {
    let places = currency.decimal_places() as usize;
    match find_by_code(currency.code()) {
        Some(entry) if entry.symbol.chars().all(|c| c.is_ascii_alphabetic()) => {
            format!("{} {:.*}", entry.symbol, places, amount)
        }
        Some(entry) => format!("{}{:.*}", entry.symbol, places, amount),
        None => format!("{:.*} {}", places, amount, currency),
    }
}
