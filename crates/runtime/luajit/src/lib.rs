//! LuaJIT runtime for Starshot.
//!
//! Compiles programs to a Lua chunk and calls their graphs through LuaJIT.
//! Values cross the boundary as JSON: `null` is `none`, arrays are lists and
//! objects are records or dictionaries.

mod codegen;

pub use codegen::{CompileError, compile};

use mlua::{Function, Lua, LuaSerdeExt, SerializeOptions, Table, Value, Variadic};
use starshot_ir::Program;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during execution.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("compilation error: {0}")]
    Compile(#[from] CompileError),

    #[error("no graph named '{0}'")]
    UnknownGraph(String),
}

/// A Lua state prepared for running compiled programs.
pub struct Runtime {
    lua: Lua,
}

impl Runtime {
    pub fn new() -> Result<Self, ExecutionError> {
        let lua = Lua::new();
        // Lists carry this metatable so they serialize as arrays even when empty.
        lua.globals().set("__array_mt", lua.array_metatable())?;
        // getmetatable() cannot see it, so the prelude asks here instead.
        let is_array = lua.create_function(|lua, value: Value| {
            Ok(match value {
                Value::Table(table) => table.metatable() == Some(lua.array_metatable()),
                _ => false,
            })
        })?;
        lua.globals().set("__is_array", is_array)?;
        Ok(Self { lua })
    }

    /// Compile `program` and evaluate the chunk, returning its graphs.
    pub fn load(&self, program: &Program) -> Result<Module<'_>, ExecutionError> {
        let code = compile(program)?;
        let exports: Table = self.lua.load(code.as_str()).set_name("=starshot").eval()?;
        let graphs: Vec<String> = program.graphs().map(|g| g.name.clone()).collect();
        info!(graphs = graphs.len(), "loaded program");
        Ok(Module {
            lua: &self.lua,
            exports,
            graphs,
        })
    }
}

/// A loaded program.
pub struct Module<'rt> {
    lua: &'rt Lua,
    exports: Table,
    graphs: Vec<String>,
}

impl Module<'_> {
    /// Graph names in definition order.
    pub fn graphs(&self) -> &[String] {
        &self.graphs
    }

    /// Call a graph with positional JSON arguments.
    pub fn call(
        &self,
        graph: &str,
        args: &[serde_json::Value],
    ) -> Result<serde_json::Value, ExecutionError> {
        let func: Option<Function> = self.exports.get(graph)?;
        let Some(func) = func else {
            return Err(ExecutionError::UnknownGraph(graph.to_string()));
        };

        let options = SerializeOptions::new()
            .serialize_none_to_null(false)
            .serialize_unit_to_null(false);
        let args = args
            .iter()
            .map(|arg| self.lua.to_value_with(arg, options))
            .collect::<mlua::Result<Variadic<Value>>>()?;

        debug!(graph, args = args.len(), "calling graph");
        let result: Value = func.call(args)?;
        Ok(self.lua.from_value(result)?)
    }
}

/// Compile `program`, then call one of its graphs in a fresh runtime.
pub fn execute(
    program: &Program,
    graph: &str,
    args: &[serde_json::Value],
) -> Result<serde_json::Value, ExecutionError> {
    let runtime = Runtime::new()?;
    let module = runtime.load(program)?;
    module.call(graph, args)
}

#[cfg(test)]
mod tests;
