/*! Unit tests for the IR data model, body builder and verifier. */

mod module_tests;
mod verify_tests;
