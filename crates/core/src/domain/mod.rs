pub mod assessment;
pub mod delta;
pub mod product;
pub mod snapshot;

pub use assessment::{
    Accessory, Answer, AssessmentSession, Defect, QuestionId, NO_DEFECTS,
};
pub use delta::{Delta, DeltaKind, DeltaSign};
pub use product::{CategoryId, ProductId, Variant, VariantId};
pub use snapshot::{AnswerPayload, RestoreError, SessionSnapshot};
