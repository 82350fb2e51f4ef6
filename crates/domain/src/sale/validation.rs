//! Structural validation of a sale request, run before any store I/O.

use common::DocumentId;

use super::{Money, SaleRequest};
use crate::error::ValidationError;

/// The HTTP method a sale must be submitted with.
pub const SALE_SUBMISSION_METHOD: &str = "POST";

/// A sale request that passed validation.
///
/// Guarantees a non-empty cart, positive quantities, a shift ID and a
/// representable change amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSale {
    request: SaleRequest,
    shift_id: DocumentId,
    change: Money,
}

impl ValidatedSale {
    /// Returns the validated request.
    pub fn request(&self) -> &SaleRequest {
        &self.request
    }

    /// Returns the shift the sale is booked against.
    pub fn shift_id(&self) -> &DocumentId {
        &self.shift_id
    }

    /// Returns the change due, computed once during validation.
    pub fn change(&self) -> Money {
        self.change
    }
}

/// Checks the inbound sale payload is well-formed. Pure, no side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestValidator;

impl RequestValidator {
    /// Validates `request` received with HTTP `method`.
    ///
    /// Checks, in order: the method, a non-empty cart, the shift ID, then
    /// each line item. The first failing check wins.
    pub fn validate(
        method: &str,
        request: SaleRequest,
    ) -> Result<ValidatedSale, ValidationError> {
        if !method.eq_ignore_ascii_case(SALE_SUBMISSION_METHOD) {
            return Err(ValidationError::MethodNotAllowed);
        }

        if request.items.is_empty() {
            return Err(ValidationError::InvalidRequest("cart is empty".to_string()));
        }

        let shift_id = match &request.shift_id {
            Some(id) if !id.is_blank() => id.clone(),
            _ => return Err(ValidationError::InactiveShift),
        };

        for (index, item) in request.items.iter().enumerate() {
            if item.item_id.is_blank() {
                return Err(ValidationError::InvalidRequest(format!(
                    "line item {} has no item ID",
                    index + 1
                )));
            }
            if item.quantity == 0 {
                return Err(ValidationError::InvalidRequest(format!(
                    "quantity for {} must be positive",
                    item.name
                )));
            }
        }

        let change = request
            .change()
            .map_err(|e| ValidationError::InvalidRequest(e.to_string()))?;

        tracing::debug!(%shift_id, items = request.items.len(), "sale request validated");
        Ok(ValidatedSale {
            request,
            shift_id,
            change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::{LineItem, Money};

    fn valid_request() -> SaleRequest {
        SaleRequest {
            shift_id: Some(DocumentId::new("S1")),
            items: vec![LineItem::new("A", "Widget", 3)],
            amount_paid: Money::new(100),
            total_amount: Money::new(90),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_request() {
        let validated = RequestValidator::validate("POST", valid_request()).unwrap();
        assert_eq!(validated.shift_id(), &DocumentId::new("S1"));
        assert_eq!(validated.request().items.len(), 1);
    }

    #[test]
    fn test_method_is_case_insensitive() {
        assert!(RequestValidator::validate("post", valid_request()).is_ok());
    }

    #[test]
    fn test_wrong_method() {
        let result = RequestValidator::validate("GET", valid_request());
        assert_eq!(result, Err(ValidationError::MethodNotAllowed));
    }

    #[test]
    fn test_method_checked_before_payload() {
        let result = RequestValidator::validate("PUT", SaleRequest::default());
        assert_eq!(result, Err(ValidationError::MethodNotAllowed));
    }

    #[test]
    fn test_empty_cart() {
        let request = SaleRequest {
            items: vec![],
            ..valid_request()
        };
        let result = RequestValidator::validate("POST", request);
        assert!(matches!(result, Err(ValidationError::InvalidRequest(_))));
    }

    #[test]
    fn test_empty_cart_checked_before_shift() {
        let result = RequestValidator::validate("POST", SaleRequest::default());
        assert!(matches!(result, Err(ValidationError::InvalidRequest(_))));
    }

    #[test]
    fn test_missing_shift() {
        let request = SaleRequest {
            shift_id: None,
            ..valid_request()
        };
        let result = RequestValidator::validate("POST", request);
        assert_eq!(result, Err(ValidationError::InactiveShift));
    }

    #[test]
    fn test_blank_shift() {
        let request = SaleRequest {
            shift_id: Some(DocumentId::new("")),
            ..valid_request()
        };
        let result = RequestValidator::validate("POST", request);
        assert_eq!(result, Err(ValidationError::InactiveShift));
    }

    #[test]
    fn test_zero_quantity() {
        let request = SaleRequest {
            items: vec![LineItem::new("A", "Widget", 0)],
            ..valid_request()
        };
        let result = RequestValidator::validate("POST", request);
        assert!(matches!(result, Err(ValidationError::InvalidRequest(msg)) if msg.contains("Widget")));
    }

    #[test]
    fn test_change_computed_on_validation() {
        let validated = RequestValidator::validate("POST", valid_request()).unwrap();
        assert_eq!(validated.change(), Money::new(10));
    }

    #[test]
    fn test_unrepresentable_change() {
        let request = SaleRequest {
            amount_paid: Money::new(i64::MIN),
            total_amount: Money::new(1),
            ..valid_request()
        };
        let result = RequestValidator::validate("POST", request);
        assert!(matches!(result, Err(ValidationError::InvalidRequest(msg)) if msg.contains("change")));
    }

    #[test]
    fn test_blank_item_id() {
        let request = SaleRequest {
            items: vec![LineItem::new("A", "Widget", 1), LineItem::new(" ", "Ghost", 1)],
            ..valid_request()
        };
        let result = RequestValidator::validate("POST", request);
        assert!(matches!(result, Err(ValidationError::InvalidRequest(msg)) if msg.contains("2")));
    }
}
