use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::delta::Delta;
use crate::domain::product::{ProductId, Variant, VariantId};

/// Sentinel defect id. Mutually exclusive with every concrete defect.
pub const NO_DEFECTS: &str = "no-defects";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// One committed response to a condition question, already normalized:
/// the delta is the one bound to the chosen option, zero-valued when the
/// option carries none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub selected_option_id: String,
    pub delta: Delta,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    pub id: String,
    pub label: String,
    pub category: String,
    pub delta: Delta,
}

impl Defect {
    pub fn is_sentinel(&self) -> bool {
        self.id == NO_DEFECTS
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessory {
    pub id: String,
    pub label: String,
    pub delta: Delta,
}

/// The aggregate carried across assessment steps. Created when a variant is
/// chosen, mutated additively as each step commits, read wholesale by the
/// quote calculator. Each mutator owns exactly one step's fields and never
/// touches another step's data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSession {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub base_price: Decimal,
    pub answers: BTreeMap<QuestionId, Answer>,
    pub selected_defects: Vec<Defect>,
    pub selected_accessories: Vec<Accessory>,
    pub created_at: DateTime<Utc>,
}

impl AssessmentSession {
    pub fn new(product_id: ProductId, variant: &Variant) -> Self {
        Self {
            product_id,
            variant_id: variant.id.clone(),
            base_price: variant.base_price,
            answers: BTreeMap::new(),
            selected_defects: Vec::new(),
            selected_accessories: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Re-picking a variant replaces only the fields the variant step owns;
    /// answers, defects, and accessories survive.
    pub fn reselect_variant(&mut self, variant: &Variant) {
        self.variant_id = variant.id.clone();
        self.base_price = variant.base_price;
    }

    /// Records one answer, replacing any earlier answer to the same question.
    pub fn record_answer(&mut self, answer: Answer) {
        self.answers.insert(answer.question_id.clone(), answer);
    }

    pub fn answered(&self, question_id: &QuestionId) -> bool {
        self.answers.contains_key(question_id)
    }

    /// Adds a defect, enforcing sentinel exclusivity: selecting `no-defects`
    /// clears every concrete defect, and selecting a concrete defect removes
    /// the sentinel. Selecting the same defect twice is a no-op.
    pub fn select_defect(&mut self, defect: Defect) {
        if defect.is_sentinel() {
            self.selected_defects.clear();
            self.selected_defects.push(defect);
            return;
        }

        self.selected_defects.retain(|existing| !existing.is_sentinel());
        if self.selected_defects.iter().all(|existing| existing.id != defect.id) {
            self.selected_defects.push(defect);
        }
    }

    pub fn deselect_defect(&mut self, defect_id: &str) {
        self.selected_defects.retain(|existing| existing.id != defect_id);
    }

    pub fn clear_defects(&mut self) {
        self.selected_defects.clear();
    }

    /// True once the defect step has been committed: either the sentinel or
    /// at least one concrete defect.
    pub fn has_defect_selection(&self) -> bool {
        !self.selected_defects.is_empty()
    }

    pub fn select_accessory(&mut self, accessory: Accessory) {
        if self.selected_accessories.iter().all(|existing| existing.id != accessory.id) {
            self.selected_accessories.push(accessory);
        }
    }

    pub fn deselect_accessory(&mut self, accessory_id: &str) {
        self.selected_accessories.retain(|existing| existing.id != accessory_id);
    }
}
