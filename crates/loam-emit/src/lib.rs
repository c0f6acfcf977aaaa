/*! Turn IR back into readable text.
 *
 * Lowering bugs are found by reading what was produced. These emitters render modules and single
 * artifacts in a stable textual form used for trace dumps and for tests.
 */

pub mod config;
pub mod emitter;
pub mod printer;

pub use config::{EmitterConfig, IndentStyle};
pub use emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
pub use printer::IrPrinter;
