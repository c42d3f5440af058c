// Utility functions
// Field validators used by the models.

pub mod validation;
