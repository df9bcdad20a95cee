//! Per-query pipeline states.

use std::fmt;

/// Where a query is in the pipeline. Transitions only move forward;
/// `ToolInvoking` is skipped when no tool is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Received,
    Retrieving,
    Fusing,
    ClassifyingAndRouting,
    ToolInvoking,
    Composing,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Retrieving => "retrieving",
            PipelineStage::Fusing => "fusing",
            PipelineStage::ClassifyingAndRouting => "classifying_and_routing",
            PipelineStage::ToolInvoking => "tool_invoking",
            PipelineStage::Composing => "composing",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}
