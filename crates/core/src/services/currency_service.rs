use serde::{Deserialize, Serialize};

use crate::models::rates::ExchangeRates;

/// An amount tagged with the currency it is expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub value: f64,
    pub code: String,
}

impl Money {
    pub fn new(value: f64, code: impl Into<String>) -> Self {
        Self {
            value,
            code: code.into(),
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_money(self.value, &self.code))
    }
}

/// Converts base-currency amounts to the display currency.
///
/// Rate tables are anchor-relative (every rate is "1 anchor = r units"), so a
/// base → target conversion goes through the anchor:
/// `value = amount / rate[base] * rate[target]`. The anchor never has to be
/// the base currency.
///
/// Missing data is never an error: when the target is the base currency, or
/// either rate is unknown, the amount comes back unchanged and tagged with the
/// base code.
#[derive(Debug, Clone)]
pub struct CurrencyService {
    base_currency: String,
}

impl CurrencyService {
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into().trim().to_uppercase(),
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Convert a base-currency amount into `target`.
    pub fn convert(&self, amount: f64, rates: &ExchangeRates, target: &str) -> Money {
        match self.rate_pair(rates, target) {
            Some((base_rate, target_rate, code)) => Money {
                value: amount / base_rate * target_rate,
                code,
            },
            None => Money {
                value: amount,
                code: self.base_currency.clone(),
            },
        }
    }

    /// Inverse of [`convert`](Self::convert): an amount typed in `from` back to base.
    pub fn to_base(&self, value: f64, rates: &ExchangeRates, from: &str) -> f64 {
        match self.rate_pair(rates, from) {
            Some((base_rate, from_rate, _)) => value / from_rate * base_rate,
            None => value,
        }
    }

    /// The code amounts will actually be shown in for `target`
    /// (the base code whenever conversion falls back to identity).
    pub fn effective_code(&self, rates: &ExchangeRates, target: &str) -> String {
        self.rate_pair(rates, target)
            .map(|(_, _, code)| code)
            .unwrap_or_else(|| self.base_currency.clone())
    }

    /// Locale-style string for a converted amount.
    pub fn format(&self, money: &Money) -> String {
        format_money(money.value, &money.code)
    }

    /// Convert then format in one step.
    pub fn format_base_amount(&self, amount: f64, rates: &ExchangeRates, target: &str) -> String {
        self.format(&self.convert(amount, rates, target))
    }

    fn rate_pair(&self, rates: &ExchangeRates, target: &str) -> Option<(f64, f64, String)> {
        let target = target.trim().to_uppercase();
        if target == self.base_currency {
            return None;
        }
        let base_rate = rates.rate(&self.base_currency)?;
        let target_rate = rates.rate(&target)?;
        Some((base_rate, target_rate, target))
    }
}

// ── Formatting ──────────────────────────────────────────────────────

/// (code, symbol, fraction digits) rendered the way an en-US locale does.
const KNOWN_CURRENCIES: &[(&str, &str, usize)] = &[
    ("USD", "$", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("INR", "₹", 2),
    ("JPY", "¥", 0),
    ("CNY", "CN¥", 2),
    ("KRW", "₩", 0),
    ("CAD", "CA$", 2),
    ("AUD", "A$", 2),
    ("NZD", "NZ$", 2),
    ("HKD", "HK$", 2),
    ("MXN", "MX$", 2),
    ("BRL", "R$", 2),
    ("TWD", "NT$", 2),
    ("ILS", "₪", 2),
    ("PHP", "₱", 2),
    ("VND", "₫", 0),
];

/// Render `value` as an en-US currency string (`₹1,234.50`, `-$3.00`, `¥1,235`).
///
/// Codes without a known symbol fall back to a grouped number with the code
/// as suffix (`1,234.50 XYZ`). Never fails; non-finite values render as zero.
pub fn format_money(value: f64, code: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let code = code.trim().to_uppercase();

    let known = KNOWN_CURRENCIES.iter().find(|(c, _, _)| *c == code);
    let digits = known.map(|(_, _, d)| *d).unwrap_or(2);

    let number = group_thousands(value.abs(), digits);
    let is_zero = number.chars().all(|c| !c.is_ascii_digit() || c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match known {
        Some((_, symbol, _)) => format!("{sign}{symbol}{number}"),
        None if code.is_empty() => format!("{sign}{number}"),
        None => format!("{sign}{number} {code}"),
    }
}

fn group_thousands(abs_value: f64, digits: usize) -> String {
    let fixed = format!("{abs_value:.digits$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}
