pub mod clone_org;
pub mod rules;
pub mod scan;
