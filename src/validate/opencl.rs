//! OpenCL device backend.
//!
//! ```text
//! ┌──────────────┐  neigh, colors  ┌──────────────────┐   out[0..count)  ┌─────────────┐
//! │  Host (CPU)  │────────────────▶│  OpenCL Device   │─────────────────▶│  Host (CPU) │
//! │  graph+batch │                 │  check_colorings │   blocking read  │  reducer    │
//! └──────────────┘                 └──────────────────┘                  └─────────────┘
//! ```
//!
//! Only compiled with the `opencl` feature.
use std::fmt;
use std::ptr;

use log::{debug, info};
use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::device::{CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_GPU, Device, get_all_devices};
use opencl3::kernel::{ExecuteKernel, Kernel};
use opencl3::memory::{Buffer, CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY};
use opencl3::program::Program;
use opencl3::types::{CL_BLOCKING, cl_int, cl_ulong};

use crate::candidate::{CandidateBatch, Color};
use crate::error::{ColoringError, Result};
use crate::graph::Graph;
use crate::reduce::ValidationResult;
use crate::validate::{Validator, check_shape};

const CHECK_COLORINGS_SOURCE: &str = include_str!("../../kernels/check_colorings.cl");
const CHECK_COLORINGS_KERNEL: &str = "check_colorings";

/// Owns the device, context, queue and built program. The kernel object and
/// its buffers are created per pass and released when the pass returns.
pub struct OpenClValidator {
    _device: Device,
    context: Context,
    queue: CommandQueue,
    program: Program,
    device_name: String,
}

// SAFETY: OpenCL 1.2+ guarantees thread safety for context, command queue,
// program and memory objects. Kernel objects are not: clSetKernelArg on a
// shared cl_kernel races, so no kernel is stored here and every pass binds
// its arguments on a kernel it created itself.
unsafe impl Send for OpenClValidator {}
unsafe impl Sync for OpenClValidator {}

impl fmt::Debug for OpenClValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenClValidator")
            .field("device_name", &self.device_name)
            .finish_non_exhaustive()
    }
}

fn unavailable(what: &str, detail: impl fmt::Display) -> ColoringError {
    ColoringError::DeviceUnavailable(format!("{what}: {detail}"))
}

fn dispatch_failed(what: &str, detail: impl fmt::Display) -> ColoringError {
    ColoringError::DispatchFailure(format!("{what}: {detail}"))
}

impl OpenClValidator {
    /// Selects the first GPU, or the first device of any type when there is
    /// no GPU and `prefer_gpu` allows it, then builds the kernel.
    pub fn new(prefer_gpu: bool) -> Result<Self> {
        let all_ids = get_all_devices(CL_DEVICE_TYPE_ALL).map_err(|e| unavailable("devices", e))?;
        let gpu_ids = get_all_devices(CL_DEVICE_TYPE_GPU).unwrap_or_default();
        let selected = match (prefer_gpu, gpu_ids.first(), all_ids.first()) {
            (true, Some(&gpu), _) => gpu,
            (_, _, Some(&any)) => any,
            (_, _, None) => return Err(unavailable("devices", "no OpenCL device found")),
        };

        let device = Device::new(selected);
        let device_name = device.name().unwrap_or_default().trim().to_string();
        let context = Context::from_device(&device).map_err(|e| unavailable("context", e))?;
        #[allow(deprecated)]
        let queue =
            CommandQueue::create_default(&context, 0).map_err(|e| unavailable("queue", e))?;
        let program = Program::create_and_build_from_source(&context, CHECK_COLORINGS_SOURCE, "")
            .map_err(|log| unavailable("program build", log))?;
        // fail at construction, not on the first pass, when the entry point is missing
        Kernel::create(&program, CHECK_COLORINGS_KERNEL).map_err(|e| unavailable("kernel", e))?;

        info!("opencl validator on device {:?}", device_name);
        Ok(Self {
            _device: device,
            context,
            queue,
            program,
            device_name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl Validator for OpenClValidator {
    fn name(&self) -> &str {
        "opencl"
    }

    fn validate(&self, graph: &Graph, batch: &CandidateBatch) -> Result<ValidationResult> {
        check_shape(graph, batch)?;
        let count = batch.len();
        if count == 0 {
            return Ok(ValidationResult::default());
        }
        let words: &[cl_ulong] = graph.as_words();
        let colors: &[Color] = batch.as_slice();
        let n = graph.vertex_count() as cl_int;
        let stride = cl_int::try_from(batch.stride())
            .map_err(|_| ColoringError::ShapeMismatch("stride exceeds device int".into()))?;

        let mut neigh_buf = unsafe {
            Buffer::<cl_ulong>::create(&self.context, CL_MEM_READ_ONLY, words.len(), ptr::null_mut())
                .map_err(|e| dispatch_failed("neighbor buffer", e))?
        };
        let mut colors_buf = unsafe {
            Buffer::<cl_int>::create(&self.context, CL_MEM_READ_ONLY, colors.len(), ptr::null_mut())
                .map_err(|e| dispatch_failed("candidate buffer", e))?
        };
        let out_buf = unsafe {
            Buffer::<cl_int>::create(&self.context, CL_MEM_WRITE_ONLY, count, ptr::null_mut())
                .map_err(|e| dispatch_failed("result buffer", e))?
        };

        unsafe {
            self.queue
                .enqueue_write_buffer(&mut neigh_buf, CL_BLOCKING, 0, words, &[])
                .map_err(|e| dispatch_failed("upload neighbors", e))?;
            self.queue
                .enqueue_write_buffer(&mut colors_buf, CL_BLOCKING, 0, colors, &[])
                .map_err(|e| dispatch_failed("upload candidates", e))?;
        }

        let kernel = Kernel::create(&self.program, CHECK_COLORINGS_KERNEL)
            .map_err(|e| dispatch_failed("kernel", e))?;
        let kernel_event = unsafe {
            ExecuteKernel::new(&kernel)
                .set_arg(&neigh_buf)
                .set_arg(&n)
                .set_arg(&colors_buf)
                .set_arg(&stride)
                .set_arg(&out_buf)
                .set_global_work_size(count)
                .enqueue_nd_range(&self.queue)
                .map_err(|e| dispatch_failed("enqueue kernel", e))?
        };
        kernel_event
            .wait()
            .map_err(|e| dispatch_failed("kernel completion", e))?;

        let mut flags = vec![0 as cl_int; count];
        unsafe {
            self.queue
                .enqueue_read_buffer(&out_buf, CL_BLOCKING, 0, &mut flags, &[])
                .map_err(|e| dispatch_failed("read results", e))?;
        }
        debug!("opencl pass: {} candidates on {}", count, self.device_name);
        ValidationResult::from_device_flags(&flags, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::enumerate_prefixes;
    use crate::graph::random_graph;
    use crate::validate::SequentialValidator;

    #[test]
    fn kernel_source_declares_the_entry_point() {
        let signature = format!("__kernel void {CHECK_COLORINGS_KERNEL}(");
        assert!(CHECK_COLORINGS_SOURCE.contains(&signature));
    }

    #[test]
    fn concurrent_passes_on_one_device_keep_their_own_arguments() {
        let Ok(device) = OpenClValidator::new(true) else {
            // no OpenCL runtime on this machine
            return;
        };
        let graph = random_graph(20, 0.3, 5).unwrap();
        let batches: Vec<_> = [(3, 6), (4, 7), (5, 5), (3, 8)]
            .into_iter()
            .map(|(k, depth)| enumerate_prefixes(20, k, depth, usize::MAX).unwrap())
            .collect();

        std::thread::scope(|scope| {
            for batch in &batches {
                let (device, graph) = (&device, &graph);
                scope.spawn(move || {
                    let expected = SequentialValidator.validate(graph, batch).unwrap();
                    for _ in 0..8 {
                        assert_eq!(device.validate(graph, batch).unwrap(), expected);
                    }
                });
            }
        });
    }
}
