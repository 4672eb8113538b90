mod script;

pub use script::{parse_action, parse_button, parse_choice, parse_condition, parse_script};
