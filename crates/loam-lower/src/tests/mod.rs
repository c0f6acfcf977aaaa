/*! Unit tests for keys, linkage, mangling, cleanups, function finalization, bridging and
 * options.
 */

mod bridging_tests;
mod cleanup_tests;
mod key_tests;
