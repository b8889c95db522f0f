pub(crate) mod compositor;
pub(crate) mod cpu;
pub(crate) mod frame;
pub(crate) mod pipeline;
pub(crate) mod record;
pub(crate) mod surface;
pub(crate) mod watermark;
