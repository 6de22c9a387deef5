pub(super) mod admin;
pub(super) mod parameter;
