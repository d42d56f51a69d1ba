//! Value formatting
//!
//! Number formatting, formatter precedence and label templates. The chart
//! configuration layer owns the exact formatter grammar; the binders only go
//! through [`ValueFormatter`].

/// Values available to a label or tooltip template
#[derive(Debug, Clone, Copy)]
pub struct FormatArgs<'a> {
    pub serie_name: &'a str,
    pub data_name: &'a str,
    pub value: f64,
    pub total: f64,
    pub numeric_formatter: &'a str,
}

/// Formatting services consumed by the binders
pub trait ValueFormatter {
    /// Format a number according to a formatter spec
    fn format_number(&self, value: f64, spec: &str) -> String;

    /// True when the formatter suppresses output entirely
    fn is_ignore(&self, formatter: &str) -> bool;

    /// Pick the first non-empty formatter: explicit, per-point, per-series, default
    fn resolve_formatter(
        &self,
        explicit: Option<&str>,
        per_point: Option<&str>,
        per_series: Option<&str>,
        default: &str,
    ) -> String {
        [explicit, per_point, per_series]
            .into_iter()
            .flatten()
            .find(|f| !f.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// Expand a label template.
    ///
    /// `{a}` series name, `{b}` data name, `{c}` value, `{d}` percent of total.
    /// An empty template yields the formatted value.
    fn format_label(&self, template: &str, args: &FormatArgs<'_>) -> String {
        let value = self.format_number(args.value, args.numeric_formatter);
        if template.is_empty() {
            return value;
        }
        let percent = if args.total != 0.0 {
            args.value / args.total * 100.0
        } else {
            0.0
        };
        template
            .replace("{a}", args.serie_name)
            .replace("{b}", args.data_name)
            .replace("{c}", &value)
            .replace("{d}", &self.format_number(percent, "F1"))
    }
}

/// Formatter understanding a small numeric grammar:
///
/// - `""`: shortest representation
/// - `F<n>`: fixed decimals
/// - `P<n>`: percent of the value (x100) with `n` decimals
/// - `N<n>`: fixed decimals with thousands separators
/// - `E<n>`: scientific notation
/// - `0.00#`: pattern; `0` is a required decimal, `#` an optional one
#[derive(Debug, Clone)]
pub struct DefaultFormatter {
    /// Formatter value that suppresses tooltip entries
    pub ignore_sentinel: String,
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self {
            ignore_sentinel: "-".to_string(),
        }
    }
}

fn precision(digits: &str, default: usize) -> usize {
    if digits.is_empty() {
        default
    } else {
        digits.parse().unwrap_or(default)
    }
}

fn group_thousands(text: &str) -> String {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(pos) => rest.split_at(pos),
        None => (rest, ""),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}{}", sign, grouped, frac_part)
}

fn format_pattern(value: f64, pattern: &str) -> String {
    let decimals = pattern.split_once('.').map(|(_, d)| d).unwrap_or("");
    let required = decimals.chars().filter(|c| *c == '0').count();
    let optional = decimals.chars().filter(|c| *c == '#').count();
    let mut text = format!("{:.*}", required + optional, value);
    if optional > 0 {
        let min_len = text.len() - optional;
        while text.len() > min_len && text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    text
}

impl ValueFormatter for DefaultFormatter {
    fn format_number(&self, value: f64, spec: &str) -> String {
        let spec = spec.trim();
        if spec.is_empty() {
            return if value == 0.0 {
                "0".to_string()
            } else {
                format!("{}", value)
            };
        }
        let mut chars = spec.chars();
        let kind = chars.next().unwrap_or_default();
        let digits = chars.as_str();
        match kind {
            'F' | 'f' => format!("{:.*}", precision(digits, 2), value),
            'P' | 'p' => format!("{:.*}%", precision(digits, 0), value * 100.0),
            'N' | 'n' => group_thousands(&format!("{:.*}", precision(digits, 2), value)),
            'E' | 'e' => format!("{:.*e}", precision(digits, 6), value),
            '0' | '#' => format_pattern(value, spec),
            _ => format!("{}", value),
        }
    }

    fn is_ignore(&self, formatter: &str) -> bool {
        formatter == self.ignore_sentinel
    }
}
