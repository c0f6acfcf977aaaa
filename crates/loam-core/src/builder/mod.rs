/*! Incremental construction of artifact bodies.
 *
 * Lowering emits instructions strictly in order through a single insertion cursor. The builder
 * owns the body under construction, hands out fresh temporaries, and closes the current block
 * whenever a terminator is written so that at most one block is ever open.
 */

pub mod body_builder;

pub use body_builder::BodyBuilder;
