//! Test data builders
//!
//! Call paths written the way a symbolic executor of a packet-processing
//! loop reports them, using the function names of the vigor preset.

use nfgraph_bdd::{Arg, Call, CallPath, Expr};

/// Builder for CallPath
#[derive(Debug)]
pub struct CallPathBuilder {
    path: CallPath,
}

impl CallPathBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            path: CallPath::new(name),
        }
    }

    /// Append an arbitrary call
    pub fn with_call(mut self, call: Call) -> Self {
        self.path.calls.push(call);
        self
    }

    /// Append a call without arguments
    pub fn with_named_call(self, function_name: &str) -> Self {
        self.with_call(Call::new(function_name))
    }

    /// Append the init marker
    pub fn with_start(self) -> Self {
        self.with_named_call("start_time")
    }

    /// Append a packet receive without outputs
    pub fn with_receive(self) -> Self {
        self.with_named_call("packet_receive")
    }

    /// Append a packet send to a constant port
    pub fn with_send(self, port: u64) -> Self {
        self.with_call(send_call(port))
    }

    /// Append a packet free
    pub fn with_free(self) -> Self {
        self.with_named_call("packet_free")
    }

    /// Add a path constraint
    pub fn with_constraint(mut self, constraint: Expr) -> Self {
        self.path.constraints.push(constraint);
        self
    }

    pub fn build(self) -> CallPath {
        self.path
    }
}

pub fn send_call(port: u64) -> Call {
    Call::new("packet_send").with_arg("dst_device", Arg::value(Expr::constant(port, 16)))
}

/// Lookup whose return value is a freshly minted `map_has_this_key` symbol
pub fn map_get_call() -> Call {
    Call::new("map_get")
        .with_arg("key", Arg::value(Expr::symbol("pkt", 8)))
        .with_ret(Expr::symbol("map_has_this_key", 8))
}
