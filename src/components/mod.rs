//! Form components opened from the patients page.
//!
//! Both modals share the same lifecycle: fields are edited freely, `submit`
//! validates and sends, and a successful send moves the form to
//! [`ModalStatus::Succeeded`] after which further submits are ignored.

pub mod add_patient_modal;
pub mod add_report_modal;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModalStatus {
    #[default]
    Editing,
    Succeeded,
}
