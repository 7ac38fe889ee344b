mod integer_variable;

pub use integer_variable::IntegerVariable;
