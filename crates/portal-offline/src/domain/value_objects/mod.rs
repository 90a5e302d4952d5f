pub mod form_kind;
