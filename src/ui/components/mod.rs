mod form_field;
mod input;
mod key_result;
mod search_input;

pub use form_field::{FormField, FORM_FIELD_HEIGHT};
pub use input::InputResult;
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
