//! Query sets (occlusion and timestamp queries).

use std::borrow::Cow;

/// What a single query set measures.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryType {
    /// Count of samples that passed the depth/stencil test during a
    /// render pass.
    Occlusion,
    /// A GPU timestamp, in device ticks (`Queue::timestamp_period` converts
    /// to nanoseconds).
    Timestamp,
}

/// Descriptor passed to `Device::create_query_set`.
#[derive(Clone, Debug)]
pub struct QuerySetDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub ty: QueryType,
    pub count: u32,
}
