//! 表单框架：控件模型、字段序列化器与校验器、各区域表单定义和编辑会话

pub mod control;
pub mod definition;
pub mod serializer;
pub mod session;
pub mod validator;

pub use control::{read_controls, write_controls, ControlKind, ControlValue, FieldControl, Form};
pub use definition::{FieldSpec, FormCatalog, FormDefinition, FormKind, FormStyle};
pub use serializer::{
    BooleanFieldSerializer, DateFieldSerializer, DoubleFieldSerializer, FieldSerializer,
    FormSerializer, IntFieldSerializer, QueueNamesFieldSerializer, StringFieldSerializer,
};
pub use session::{EditForm, FormErrors, SubmissionState};
pub use validator::{
    EnumFieldValidator, FieldValidator, FormValidator, JsonFieldValidator, LengthFieldValidator,
    RangeBounds, RangeFieldValidator, RegexFieldValidator, RequiredFieldValidator,
};
