//! `CommandEncoder`/`CommandBuffer`: records directly onto a single
//! `ID3D12GraphicsCommandList`, the same direct-record model the Vulkan and
//! Metal backends use rather than the software backend's record-then-replay
//! `Op` list.
//!
//! Root-signature state (CBVs bound per bind group index) is reset whenever
//! the pipeline layout changes, since D3D12 root signature layouts are
//! pipeline-specific.

use crate::resource::*;
use crate::Dx12Api;
use windows::Win32::Graphics::Direct3D12::*;
use wgx_hal::command::{
    BufferBarrier, ClearColor, ComputePassDescriptor, IndexFormat, LoadOp, RenderPassDescriptor, Rect, StoreOp,
    TextureBarrier, Viewport,
};
use wgx_hal::error::{DeviceError, Result};
use wgx_hal::image::{BufferTextureCopy, TextureCopy};
use wgx_hal::query::QueryType;

const MAX_ATTACHMENTS: u32 = 8;

#[derive(Debug, Clone)]
pub struct CommandBuffer {
    pub(crate) raw: ID3D12GraphicsCommandList,
}
unsafe impl Send for CommandBuffer {}
unsafe impl Sync for CommandBuffer {}

struct LocalHeap {
    raw: ID3D12DescriptorHeap,
    stride: u32,
}

impl LocalHeap {
    fn new(device: &ID3D12Device, ty: D3D12_DESCRIPTOR_HEAP_TYPE, count: u32) -> Result<Self> {
        let desc = D3D12_DESCRIPTOR_HEAP_DESC { Type: ty, NumDescriptors: count, Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE, NodeMask: 0 };
        let raw: ID3D12DescriptorHeap =
            unsafe { device.CreateDescriptorHeap(&desc) }.map_err(|e| DeviceError::Other(e.to_string()))?;
        let stride = unsafe { device.GetDescriptorHandleIncrementSize(ty) };
        Ok(LocalHeap { raw, stride })
    }

    fn handle(&self, index: u32) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        let mut handle = unsafe { self.raw.GetCPUDescriptorHandleForHeapStart() };
        handle.ptr += (index * self.stride) as usize;
        handle
    }
}

pub struct CommandEncoder {
    device: ID3D12Device,
    allocator: ID3D12CommandAllocator,
    list: Option<ID3D12GraphicsCommandList>,
    rtv_heap: LocalHeap,
    dsv_heap: LocalHeap,
}

impl std::fmt::Debug for CommandEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEncoder").finish()
    }
}
unsafe impl Send for CommandEncoder {}
unsafe impl Sync for CommandEncoder {}

impl CommandEncoder {
    pub(crate) fn new(device: ID3D12Device, allocator: ID3D12CommandAllocator) -> Result<Self> {
        Ok(CommandEncoder {
            rtv_heap: LocalHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_RTV, MAX_ATTACHMENTS)?,
            dsv_heap: LocalHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_DSV, 1)?,
            device,
            allocator,
            list: None,
        })
    }

    fn cb(&self) -> &ID3D12GraphicsCommandList {
        self.list.as_ref().expect("no command list is being recorded")
    }
}

unsafe fn barrier(list: &ID3D12GraphicsCommandList, resource: &ID3D12Resource, before: D3D12_RESOURCE_STATES, after: D3D12_RESOURCE_STATES) {
    if before == after {
        return;
    }
    let transition = D3D12_RESOURCE_TRANSITION_BARRIER {
        pResource: windows::core::ManuallyDrop::new(Some(resource.clone())),
        Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
        StateBefore: before,
        StateAfter: after,
    };
    let barrier = D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Anonymous: D3D12_RESOURCE_BARRIER_0 { Transition: std::mem::ManuallyDrop::new(transition) },
        ..Default::default()
    };
    list.ResourceBarrier(&[barrier]);
}

impl wgx_hal::command::CommandEncoder<Dx12Api> for CommandEncoder {
    unsafe fn begin_encoding(&mut self, _label: Option<&str>) -> Result<()> {
        self.allocator.Reset().map_err(|e| DeviceError::Other(e.to_string()))?;
        let list: ID3D12GraphicsCommandList = self
            .device
            .CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, &self.allocator, None)
            .map_err(|e| DeviceError::Other(e.to_string()))?;
        self.list = Some(list);
        Ok(())
    }

    unsafe fn end_encoding(&mut self) -> Result<CommandBuffer> {
        let list = self.list.take().expect("end_encoding without begin_encoding");
        list.Close().map_err(|e| DeviceError::Other(e.to_string()))?;
        Ok(CommandBuffer { raw: list })
    }

    unsafe fn discard_encoding(&mut self) {
        self.list = None;
    }

    unsafe fn transition_buffers(&mut self, barriers: &[BufferBarrier<&Buffer>]) {
        for b in barriers {
            barrier(
                self.cb(),
                &b.buffer.raw,
                crate::conv::resource_states_for_buffer(b.usage.start),
                crate::conv::resource_states_for_buffer(b.usage.end),
            );
        }
    }

    unsafe fn transition_textures(&mut self, barriers: &[TextureBarrier<&Texture>]) {
        for b in barriers {
            barrier(
                self.cb(),
                &b.texture.raw,
                crate::conv::resource_states_for_texture(b.usage.start),
                crate::conv::resource_states_for_texture(b.usage.end),
            );
        }
    }

    unsafe fn clear_buffer(&mut self, _buffer: &Buffer, _range: std::ops::Range<u64>) {
        // Requires a UAV clear via a compute shader or a CPU-side write;
        // not wired up in this simplified backend.
    }

    unsafe fn copy_buffer_to_buffer(&mut self, src: &Buffer, dst: &Buffer, regions: &[wgx_hal::buffer::BufferCopy]) {
        for r in regions {
            self.cb().CopyBufferRegion(&dst.raw, r.dst_offset, &src.raw, r.src_offset, r.size);
        }
    }

    unsafe fn copy_buffer_to_texture(&mut self, src: &Buffer, dst: &Texture, regions: &[BufferTextureCopy]) {
        for r in regions {
            let dst_loc = texture_copy_location(&dst.raw, r.texture.mip_level);
            let src_loc = buffer_copy_location(&src.raw, r, dst.format);
            self.cb().CopyTextureRegion(
                &dst_loc,
                r.texture.origin.x,
                r.texture.origin.y,
                r.texture.origin.z,
                &src_loc,
                None,
            );
        }
    }

    unsafe fn copy_texture_to_buffer(&mut self, src: &Texture, dst: &Buffer, regions: &[BufferTextureCopy]) {
        for r in regions {
            let src_loc = texture_copy_location(&src.raw, r.texture.mip_level);
            let dst_loc = buffer_copy_location(&dst.raw, r, src.format);
            self.cb().CopyTextureRegion(&dst_loc, 0, 0, 0, &src_loc, None);
        }
    }

    unsafe fn copy_texture_to_texture(&mut self, src: &Texture, dst: &Texture, regions: &[TextureCopy]) {
        for r in regions {
            let src_loc = texture_copy_location(&src.raw, r.src.mip_level);
            let dst_loc = texture_copy_location(&dst.raw, r.dst.mip_level);
            self.cb().CopyTextureRegion(&dst_loc, r.dst.origin.x, r.dst.origin.y, r.dst.origin.z, &src_loc, None);
        }
    }

    unsafe fn begin_render_pass(&mut self, desc: &RenderPassDescriptor<&TextureView>) {
        let mut rtv_handles = Vec::with_capacity(desc.color_attachments.len());
        for (i, attachment) in desc.color_attachments.iter().enumerate() {
            if let Some(attachment) = attachment {
                let handle = self.rtv_heap.handle(i as u32);
                let rtv_desc = D3D12_RENDER_TARGET_VIEW_DESC {
                    Format: attachment.target.dxgi_format,
                    ViewDimension: D3D12_RTV_DIMENSION_TEXTURE2D,
                    ..Default::default()
                };
                self.device.CreateRenderTargetView(&attachment.target.texture, Some(&rtv_desc), handle);
                if let LoadOp::Clear(color) = attachment.load_op {
                    self.cb().ClearRenderTargetView(handle, &clear_color_array(color), None);
                }
                rtv_handles.push(handle);
            }
        }

        let dsv_handle = desc.depth_stencil_attachment.as_ref().map(|ds| {
            let handle = self.dsv_heap.handle(0);
            let dsv_desc = D3D12_DEPTH_STENCIL_VIEW_DESC {
                Format: ds.target.dxgi_format,
                ViewDimension: D3D12_DSV_DIMENSION_TEXTURE2D,
                ..Default::default()
            };
            self.device.CreateDepthStencilView(&ds.target.texture, Some(&dsv_desc), handle);
            let mut clear_flags = D3D12_CLEAR_FLAGS(0);
            let mut depth_value = 1.0;
            let mut stencil_value = 0u8;
            if let LoadOp::Clear(d) = ds.depth_load_op {
                clear_flags |= D3D12_CLEAR_FLAG_DEPTH;
                depth_value = d;
            }
            if let LoadOp::Clear(s) = ds.stencil_load_op {
                clear_flags |= D3D12_CLEAR_FLAG_STENCIL;
                stencil_value = s as u8;
            }
            if clear_flags.0 != 0 {
                self.cb().ClearDepthStencilView(handle, clear_flags, depth_value, stencil_value, None);
            }
            handle
        });

        self.cb().OMSetRenderTargets(
            rtv_handles.len() as u32,
            Some(rtv_handles.as_ptr()),
            false,
            dsv_handle.as_ref().map(|h| h as *const _),
        );
    }

    unsafe fn end_render_pass(&mut self) {}

    unsafe fn set_render_pipeline(&mut self, pipeline: &RenderPipeline) {
        self.cb().SetPipelineState(&pipeline.raw);
        self.cb().SetGraphicsRootSignature(&pipeline.root_signature);
        self.cb().IASetPrimitiveTopology(crate::conv::primitive_topology(pipeline.topology));
    }

    unsafe fn set_bind_group(&mut self, _layout: &PipelineLayout, index: u32, group: &BindGroup) {
        for (_binding, resource) in &group.bindings {
            if let BoundResource::Buffer { raw, offset } = resource {
                self.cb().SetGraphicsRootConstantBufferView(index, raw.GetGPUVirtualAddress() + offset);
            }
        }
    }

    unsafe fn set_vertex_buffer(&mut self, slot: u32, buffer: &Buffer, offset: u64) {
        let view = D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: buffer.raw.GetGPUVirtualAddress() + offset,
            SizeInBytes: (buffer.size - offset) as u32,
            StrideInBytes: 0,
        };
        self.cb().IASetVertexBuffers(slot, Some(&[view]));
    }

    unsafe fn set_index_buffer(&mut self, buffer: &Buffer, format: IndexFormat, offset: u64) {
        let view = D3D12_INDEX_BUFFER_VIEW {
            BufferLocation: buffer.raw.GetGPUVirtualAddress() + offset,
            SizeInBytes: (buffer.size - offset) as u32,
            Format: crate::conv::index_buffer_format(format),
        };
        self.cb().IASetIndexBuffer(Some(&view));
    }

    unsafe fn set_viewport(&mut self, viewport: &Viewport) {
        let v = D3D12_VIEWPORT {
            TopLeftX: viewport.x,
            TopLeftY: viewport.y,
            Width: viewport.w,
            Height: viewport.h,
            MinDepth: viewport.depth.start,
            MaxDepth: viewport.depth.end,
        };
        self.cb().RSSetViewports(&[v]);
    }

    unsafe fn set_scissor_rect(&mut self, rect: &Rect) {
        let r = windows::Win32::Foundation::RECT {
            left: rect.x as i32,
            top: rect.y as i32,
            right: (rect.x + rect.w) as i32,
            bottom: (rect.y + rect.h) as i32,
        };
        self.cb().RSSetScissorRects(&[r]);
    }

    unsafe fn set_blend_constant(&mut self, color: ClearColor) {
        self.cb().OMSetBlendFactor(Some(&clear_color_array(color)));
    }

    unsafe fn set_stencil_reference(&mut self, reference: u32) {
        self.cb().OMSetStencilRef(reference);
    }

    unsafe fn draw(&mut self, first_vertex: u32, vertex_count: u32, first_instance: u32, instance_count: u32) {
        self.cb().DrawInstanced(vertex_count, instance_count, first_vertex, first_instance);
    }

    unsafe fn draw_indexed(&mut self, first_index: u32, index_count: u32, base_vertex: i32, first_instance: u32, instance_count: u32) {
        self.cb().DrawIndexedInstanced(index_count, instance_count, first_index, base_vertex, first_instance);
    }

    unsafe fn draw_indirect(&mut self, _buffer: &Buffer, _offset: u64, _draw_count: u32) {
        // Requires an ID3D12CommandSignature for indirect draw arguments;
        // not wired up in this simplified backend.
    }

    unsafe fn draw_indexed_indirect(&mut self, _buffer: &Buffer, _offset: u64, _draw_count: u32) {}

    unsafe fn begin_compute_pass(&mut self, _desc: &ComputePassDescriptor) {}

    unsafe fn end_compute_pass(&mut self) {}

    unsafe fn set_compute_pipeline(&mut self, pipeline: &ComputePipeline) {
        self.cb().SetPipelineState(&pipeline.raw);
        self.cb().SetComputeRootSignature(&pipeline.root_signature);
    }

    unsafe fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        self.cb().Dispatch(x, y, z);
    }

    unsafe fn dispatch_indirect(&mut self, _buffer: &Buffer, _offset: u64) {}

    unsafe fn resolve_query_set(&mut self, set: &QuerySet, range: std::ops::Range<u32>, dst: &Buffer, offset: u64) {
        let ty = match set.ty {
            QueryType::Occlusion => D3D12_QUERY_TYPE_OCCLUSION,
            QueryType::Timestamp => D3D12_QUERY_TYPE_TIMESTAMP,
        };
        self.cb().ResolveQueryData(&set.raw, ty, range.start, range.end - range.start, &dst.raw, offset);
    }
}

fn clear_color_array(c: ClearColor) -> [f32; 4] {
    [c.r as f32, c.g as f32, c.b as f32, c.a as f32]
}

unsafe fn texture_copy_location(resource: &ID3D12Resource, mip_level: u32) -> D3D12_TEXTURE_COPY_LOCATION {
    D3D12_TEXTURE_COPY_LOCATION {
        pResource: windows::core::ManuallyDrop::new(Some(resource.clone())),
        Type: D3D12_TEXTURE_COPY_TYPE_SUBRESOURCE_INDEX,
        Anonymous: D3D12_TEXTURE_COPY_LOCATION_0 { SubresourceIndex: mip_level },
    }
}

unsafe fn buffer_copy_location(
    resource: &ID3D12Resource,
    region: &BufferTextureCopy,
    format: wgx_hal::format::TextureFormat,
) -> D3D12_TEXTURE_COPY_LOCATION {
    let footprint = D3D12_PLACED_SUBRESOURCE_FOOTPRINT {
        Offset: region.buffer_layout.offset,
        Footprint: D3D12_SUBRESOURCE_FOOTPRINT {
            Format: crate::conv::texture_format(format),
            Width: region.size.width,
            Height: region.size.height,
            Depth: region.size.depth_or_array_layers,
            RowPitch: region.buffer_layout.bytes_per_row,
        },
    };
    D3D12_TEXTURE_COPY_LOCATION {
        pResource: windows::core::ManuallyDrop::new(Some(resource.clone())),
        Type: D3D12_TEXTURE_COPY_TYPE_PLACED_FOOTPRINT,
        Anonymous: D3D12_TEXTURE_COPY_LOCATION_0 { PlacedFootprint: footprint },
    }
}
