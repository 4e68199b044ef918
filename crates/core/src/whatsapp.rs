//! WhatsApp order-summary deep-link.
//!
//! After checkout the customer sends the PIX receipt to the stand over
//! WhatsApp. The link pre-populates the conversation with an itemized order
//! summary, percent-encoded for the `wa.me` URL.

use rust_decimal::Decimal;

use crate::currency::format_brl;

/// One line of the order summary sent to the stand.
#[derive(Debug, Clone)]
pub struct OrderSummaryLine {
    /// Product name, including any customization annotations.
    pub name: String,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price.
    pub unit_price: Decimal,
}

/// Build the `wa.me` deep-link with the pre-populated order message.
#[must_use]
pub fn order_link(
    phone: &str,
    customer_name: &str,
    lines: &[OrderSummaryLine],
    total: Decimal,
    transaction_id: &str,
) -> String {
    let items_text = lines
        .iter()
        .map(|line| {
            format!(
                "• {}x {} - {}",
                line.quantity,
                line.name,
                format_brl(line.unit_price * Decimal::from(line.quantity))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let message = format!(
        "*Novo pedido iFacens!*\n\n\
         *Nome:* {customer_name}\n\
         *ID da Transação:* {transaction_id}\n\n\
         *Itens do Pedido:*\n{items_text}\n\n\
         *Total:* {}\n\n\
         Estou enviando o comprovante do PIX.",
        format_brl(total)
    );

    format!("https://wa.me/{phone}?text={}", urlencoding::encode(&message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_link_encodes_summary() {
        let lines = vec![
            OrderSummaryLine {
                name: "X-Salada".to_string(),
                quantity: 2,
                unit_price: Decimal::new(1500, 2),
            },
            OrderSummaryLine {
                name: "Suco de Laranja".to_string(),
                quantity: 1,
                unit_price: Decimal::new(600, 2),
            },
        ];

        let link = order_link(
            "5515999999999",
            "Maria",
            &lines,
            Decimal::new(3600, 2),
            "ifacens-abc123-xyz",
        );

        assert!(link.starts_with("https://wa.me/5515999999999?text="));
        // the message is percent-encoded; spaces become %20
        assert!(link.contains("Maria"));
        assert!(link.contains("ifacens-abc123-xyz"));
        assert!(link.contains("X-Salada"));
        assert!(!link.contains(' '));
    }

    #[test]
    fn test_order_link_line_subtotals_use_brl() {
        let lines = vec![OrderSummaryLine {
            name: "Pastel".to_string(),
            quantity: 3,
            unit_price: Decimal::new(850, 2),
        }];

        let link = order_link("5515999999999", "João", &lines, Decimal::new(2550, 2), "tx");
        let decoded = urlencoding::decode(link.split("text=").nth(1).unwrap_or_default())
            .unwrap_or_default();

        assert!(decoded.contains("• 3x Pastel - R$ 25,50"));
        assert!(decoded.contains("*Total:* R$ 25,50"));
    }
}
