/// Format a rupee amount with Indian digit grouping (e.g. ₹23,23,391).
pub fn format_inr(value: f64) -> String {
    let rupees = value.abs().round() as u64;
    let sign = if value < 0.0 && rupees > 0 { "-" } else { "" };
    format!("{sign}₹{}", group_indian(rupees))
}

/// Format a rupee amount compactly in lakhs or crores (e.g. ₹23.23 L, ₹1.20 Cr).
/// Amounts below one lakh fall back to full grouping.
pub fn format_compact_inr(value: f64) -> String {
    const LAKH: f64 = 100_000.0;
    const CRORE: f64 = 10_000_000.0;

    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs_value >= CRORE {
        format!("{sign}₹{:.2} Cr", abs_value / CRORE)
    } else if abs_value >= LAKH {
        format!("{sign}₹{:.2} L", abs_value / LAKH)
    } else {
        format_inr(value)
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

// Last three digits form one group, everything before them groups in pairs.
fn group_indian(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut grouped = String::new();
    for (i, c) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.push(',');
    grouped.push_str(tail);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_digits_the_indian_way() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(999.0), "₹999");
        assert_eq!(format_inr(1_200.0), "₹1,200");
        assert_eq!(format_inr(100_000.0), "₹1,00,000");
        assert_eq!(format_inr(2_323_390.76), "₹23,23,391");
        assert_eq!(format_inr(123_456_789.0), "₹12,34,56,789");
        assert_eq!(format_inr(-1_200.4), "-₹1,200");
    }

    #[test]
    fn negative_amount_rounding_to_zero_drops_sign() {
        assert_eq!(format_inr(-0.4), "₹0");
        assert_eq!(format_inr(-0.5), "-₹1");
    }

    #[test]
    fn compacts_into_lakhs_and_crores() {
        assert_eq!(format_compact_inr(50_000.0), "₹50,000");
        assert_eq!(format_compact_inr(2_323_390.76), "₹23.23 L");
        assert_eq!(format_compact_inr(12_000_000.0), "₹1.20 Cr");
        assert_eq!(format_compact_inr(-150_000.0), "-₹1.50 L");
    }

    #[test]
    fn formats_percentages_with_two_decimals() {
        assert_eq!(format_percentage(12.0), "12.00%");
        assert_eq!(format_percentage(7.126), "7.13%");
    }
}
