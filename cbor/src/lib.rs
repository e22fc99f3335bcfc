/*!
A small CBOR (RFC 8949) encoder and streaming decoder.

The encoder writes into a growable buffer through closures that keep definite
length arrays honest. The decoder never builds an intermediate tree: callers
walk the input item by item, and every step returns a `Result`, so truncated or
hostile input is reported rather than trusted.
*/

pub mod decode;
pub mod encode;


#[cfg(test)]
mod encode_tests;
