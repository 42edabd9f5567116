//! Static registry of renderable condition and action kinds.
//!
//! The metadata catalog says which kinds the backend *offers*; this registry says which
//! kinds the client can *render*. A kind may be offered but not renderable, in which
//! case it resolves to a disabled placeholder instead of failing.

use std::fmt;

use crate::models::FieldValue;

pub const MIN_AMOUNT: &str = "MIN_AMOUNT";
pub const TARGET_CATEGORY: &str = "TARGET_CATEGORY";
pub const PERCENTAGE_DISCOUNT: &str = "PERCENTAGE_DISCOUNT";
pub const FIXED_DISCOUNT: &str = "FIXED_DISCOUNT";

/// One entry of a select control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Product categories a category condition can target.
pub const CATEGORIES: &[SelectOption] = &[
    SelectOption {
        value: "073e7bb2-fd8d-4868-aa8c-b18d2ed16538",
        label: "Dairy",
    },
    SelectOption {
        value: "073e7bb2-fd8d-4868-aa8c-b18d2ed16539",
        label: "Beverages",
    },
    SelectOption {
        value: "073e7bb2-fd8d-4868-aa8c-b18d2ed16540",
        label: "Snacks",
    },
];

/// Description of the input a view should draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Number {
        min: Option<f64>,
        max: Option<f64>,
        placeholder: &'static str,
    },
    Select {
        options: &'static [SelectOption],
        placeholder: &'static str,
    },
    /// Offered by the backend but unknown to this client.
    Unsupported,
}

/// A control ready to draw: label, input shape and the current value as text.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub label: String,
    pub control: Control,
    pub value: String,
    pub disabled: bool,
}

/// The uniform `(value, on_change)` contract every kind's input satisfies.
pub trait FieldWidget: fmt::Debug + Send + Sync {
    /// Draw the control for the current value.
    fn render(&self, label: &str, current: &FieldValue) -> RenderedField;

    /// Turn raw user input into the value stored on the row.
    fn on_change(&self, raw: &str) -> FieldValue;
}

/// Free numeric input, optionally clamped.
#[derive(Debug)]
pub struct NumberInput {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub clamp: bool,
    pub placeholder: &'static str,
}

impl FieldWidget for NumberInput {
    fn render(&self, label: &str, current: &FieldValue) -> RenderedField {
        RenderedField {
            label: label.to_string(),
            control: Control::Number {
                min: self.min,
                max: self.max,
                placeholder: self.placeholder,
            },
            value: if current.is_empty() {
                String::new()
            } else {
                current.to_string()
            },
            disabled: false,
        }
    }

    fn on_change(&self, raw: &str) -> FieldValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::empty();
        }
        // Unparseable or non-finite input is kept as typed; the step validators reject it.
        let Some(mut number) = trimmed.parse::<f64>().ok().filter(|n| n.is_finite()) else {
            return FieldValue::Text(trimmed.to_string());
        };
        if self.clamp {
            if let Some(min) = self.min {
                number = number.max(min);
            }
            if let Some(max) = self.max {
                number = number.min(max);
            }
        }
        FieldValue::Number(number)
    }
}

/// Choice among a fixed option list; the stored value is the option's value.
#[derive(Debug)]
pub struct SelectInput {
    pub options: &'static [SelectOption],
    pub placeholder: &'static str,
}

impl FieldWidget for SelectInput {
    fn render(&self, label: &str, current: &FieldValue) -> RenderedField {
        RenderedField {
            label: label.to_string(),
            control: Control::Select {
                options: self.options,
                placeholder: self.placeholder,
            },
            value: current.to_string(),
            disabled: false,
        }
    }

    fn on_change(&self, raw: &str) -> FieldValue {
        FieldValue::Text(raw.trim().to_string())
    }
}

/// A renderable kind.
#[derive(Debug)]
pub struct FieldEntry {
    pub kind: &'static str,
    pub label: &'static str,
    pub widget: &'static dyn FieldWidget,
}

static MIN_AMOUNT_INPUT: NumberInput = NumberInput {
    min: Some(0.0),
    max: None,
    clamp: false,
    placeholder: "e.g. 50",
};

static CATEGORY_SELECT: SelectInput = SelectInput {
    options: CATEGORIES,
    placeholder: "Select a category",
};

static PERCENTAGE_INPUT: NumberInput = NumberInput {
    min: Some(0.0),
    max: Some(100.0),
    clamp: true,
    placeholder: "e.g. 10",
};

static FIXED_AMOUNT_INPUT: NumberInput = NumberInput {
    min: Some(1.0),
    max: None,
    clamp: false,
    placeholder: "e.g. 500",
};

static CONDITION_FIELDS: [FieldEntry; 2] = [
    FieldEntry {
        kind: MIN_AMOUNT,
        label: "Minimum purchase amount",
        widget: &MIN_AMOUNT_INPUT,
    },
    FieldEntry {
        kind: TARGET_CATEGORY,
        label: "Specific category",
        widget: &CATEGORY_SELECT,
    },
];

static ACTION_FIELDS: [FieldEntry; 2] = [
    FieldEntry {
        kind: PERCENTAGE_DISCOUNT,
        label: "Percentage discount",
        widget: &PERCENTAGE_INPUT,
    },
    FieldEntry {
        kind: FIXED_DISCOUNT,
        label: "Fixed amount discount",
        widget: &FIXED_AMOUNT_INPUT,
    },
];

/// Outcome of looking a kind up.
#[derive(Debug, Clone, Copy)]
pub enum FieldResolution<'a> {
    Renderable(&'a FieldEntry),
    Placeholder,
}

/// A selectable kind for a kind picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindOption {
    pub kind: String,
    pub label: String,
    pub renderable: bool,
}

/// Lookup from kind to label and widget for one family of kinds.
#[derive(Debug, Clone, Copy)]
pub struct FieldRegistry {
    entries: &'static [FieldEntry],
}

impl FieldRegistry {
    pub fn conditions() -> Self {
        Self {
            entries: &CONDITION_FIELDS,
        }
    }

    pub fn actions() -> Self {
        Self {
            entries: &ACTION_FIELDS,
        }
    }

    pub fn entries(&self) -> &'static [FieldEntry] {
        self.entries
    }

    pub fn resolve(&self, kind: &str) -> FieldResolution<'static> {
        match self.entries.iter().find(|entry| entry.kind == kind) {
            Some(entry) => FieldResolution::Renderable(entry),
            None => FieldResolution::Placeholder,
        }
    }

    pub fn is_renderable(&self, kind: &str) -> bool {
        matches!(self.resolve(kind), FieldResolution::Renderable(_))
    }

    /// Human label, or the raw kind when unknown.
    pub fn label<'k>(&self, kind: &'k str) -> &'k str {
        match self.resolve(kind) {
            FieldResolution::Renderable(entry) => entry.label,
            FieldResolution::Placeholder => kind,
        }
    }

    /// Draw a row's value input. Unknown kinds get a disabled placeholder.
    pub fn render(&self, kind: &str, current: &FieldValue) -> RenderedField {
        match self.resolve(kind) {
            FieldResolution::Renderable(entry) => entry.widget.render(entry.label, current),
            FieldResolution::Placeholder => {
                tracing::debug!(kind, "kind is offered but has no registered widget");
                RenderedField {
                    label: kind.to_string(),
                    control: Control::Unsupported,
                    value: current.to_string(),
                    disabled: true,
                }
            }
        }
    }

    /// Normalise raw input for `kind`. Unknown kinds keep the raw text.
    pub fn on_change(&self, kind: &str, raw: &str) -> FieldValue {
        match self.resolve(kind) {
            FieldResolution::Renderable(entry) => entry.widget.on_change(raw),
            FieldResolution::Placeholder => FieldValue::Text(raw.to_string()),
        }
    }

    /// Picker options for the kinds the catalog currently offers, in catalog order.
    pub fn options(&self, offered: &[String]) -> Vec<KindOption> {
        offered
            .iter()
            .map(|kind| KindOption {
                kind: kind.clone(),
                label: self.label(kind).to_string(),
                renderable: self.is_renderable(kind),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds_resolve() {
        let conditions = FieldRegistry::conditions();
        assert!(conditions.is_renderable(MIN_AMOUNT));
        assert!(conditions.is_renderable(TARGET_CATEGORY));
        assert!(!conditions.is_renderable(PERCENTAGE_DISCOUNT));

        let actions = FieldRegistry::actions();
        assert_eq!(actions.label(FIXED_DISCOUNT), "Fixed amount discount");
    }

    #[test]
    fn test_unknown_kind_renders_disabled_placeholder() {
        let field = FieldRegistry::conditions().render("LOYALTY_LEVEL", &FieldValue::from("gold"));
        assert!(field.disabled);
        assert_eq!(field.control, Control::Unsupported);
        assert_eq!(field.label, "LOYALTY_LEVEL");
        assert_eq!(field.value, "gold");
    }

    #[test]
    fn test_percentage_input_clamps() {
        let actions = FieldRegistry::actions();
        assert_eq!(
            actions.on_change(PERCENTAGE_DISCOUNT, "150"),
            FieldValue::Number(100.0)
        );
        assert_eq!(
            actions.on_change(PERCENTAGE_DISCOUNT, "-4"),
            FieldValue::Number(0.0)
        );
        assert_eq!(actions.on_change(PERCENTAGE_DISCOUNT, ""), FieldValue::empty());
    }

    #[test]
    fn test_amount_input_parses_numbers() {
        let conditions = FieldRegistry::conditions();
        assert_eq!(conditions.on_change(MIN_AMOUNT, " 50 "), FieldValue::Number(50.0));
        assert_eq!(
            conditions.on_change(MIN_AMOUNT, "fifty"),
            FieldValue::Text("fifty".to_string())
        );
        assert_eq!(
            FieldRegistry::actions().on_change(FIXED_DISCOUNT, "inf"),
            FieldValue::Text("inf".to_string())
        );
    }

    #[test]
    fn test_category_select_renders_options() {
        let field = FieldRegistry::conditions().render(TARGET_CATEGORY, &FieldValue::empty());
        match field.control {
            Control::Select { options, .. } => assert_eq!(options.len(), CATEGORIES.len()),
            other => panic!("unexpected control {other:?}"),
        }
        assert!(!field.disabled);
    }

    #[test]
    fn test_options_mark_unrenderable_kinds() {
        let offered = vec![MIN_AMOUNT.to_string(), "CUSTOMER_TAG".to_string()];
        let options = FieldRegistry::conditions().options(&offered);

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Minimum purchase amount");
        assert!(options[0].renderable);
        assert_eq!(options[1].label, "CUSTOMER_TAG");
        assert!(!options[1].renderable);
    }
}
