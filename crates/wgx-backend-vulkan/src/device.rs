//! `Device` and `Queue`: resource creation/destruction and submission.

use crate::instance::{Surface, SurfaceTexture};
use crate::resource::*;
use crate::VulkanApi;
use ash::vk;
use std::time::Duration;
use wgx_hal::buffer::BufferDescriptor;
use wgx_hal::command::CommandEncoderDescriptor;
use wgx_hal::device::FenceValue;
use wgx_hal::error::{DeviceError, Result, SurfaceError, TimeoutError};
use wgx_hal::image::{Extent3d, ImageDataLayout, SamplerDescriptor, TextureDescriptor, TextureViewDescriptor};
use wgx_hal::pso::{
    BindGroupDescriptor, BindGroupLayoutDescriptor, BindingType, BoundResource, ComputePipelineDescriptor,
    PipelineLayoutDescriptor, RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderSource,
};
use wgx_hal::query::QuerySetDescriptor;
use wgx_hal::window::AcquiredSurfaceTexture;

fn map_vk_result<T>(result: std::result::Result<T, vk::Result>) -> Result<T> {
    result.map_err(|e| match e {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => DeviceError::OutOfMemory,
        vk::Result::ERROR_DEVICE_LOST => DeviceError::Lost,
        other => DeviceError::Other(other.to_string()),
    })
}

pub struct Device {
    pub(crate) raw: ash::Device,
    pub(crate) instance: ash::Instance,
    pub(crate) physical_device: vk::PhysicalDevice,
    pub(crate) memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub(crate) queue_family_index: u32,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").finish()
    }
}

impl Device {
    pub(crate) fn instance_handle(&self) -> &ash::Instance {
        &self.instance
    }

    fn find_memory_type(&self, type_bits: u32, flags: vk::MemoryPropertyFlags) -> u32 {
        for i in 0..self.memory_properties.memory_type_count {
            if type_bits & (1 << i) != 0
                && self.memory_properties.memory_types[i as usize].property_flags.contains(flags)
            {
                return i;
            }
        }
        0
    }

    unsafe fn allocate_for_buffer(&self, buffer: vk::Buffer) -> Result<vk::DeviceMemory> {
        let reqs = self.raw.get_buffer_memory_requirements(buffer);
        let type_index = self.find_memory_type(
            reqs.memory_type_bits,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        );
        let alloc_info = vk::MemoryAllocateInfo::builder().allocation_size(reqs.size).memory_type_index(type_index);
        let memory = map_vk_result(self.raw.allocate_memory(&alloc_info, None))?;
        map_vk_result(self.raw.bind_buffer_memory(buffer, memory, 0))?;
        Ok(memory)
    }

    unsafe fn allocate_for_image(&self, image: vk::Image) -> Result<vk::DeviceMemory> {
        let reqs = self.raw.get_image_memory_requirements(image);
        let type_index = self.find_memory_type(reqs.memory_type_bits, vk::MemoryPropertyFlags::DEVICE_LOCAL);
        let alloc_info = vk::MemoryAllocateInfo::builder().allocation_size(reqs.size).memory_type_index(type_index);
        let memory = map_vk_result(self.raw.allocate_memory(&alloc_info, None))?;
        map_vk_result(self.raw.bind_image_memory(image, memory, 0))?;
        Ok(memory)
    }
}

impl wgx_hal::device::Device<VulkanApi> for Device {
    unsafe fn create_buffer(&self, desc: &BufferDescriptor) -> Result<Buffer> {
        let create_info = vk::BufferCreateInfo::builder()
            .size(desc.size.max(1))
            .usage(crate::conv::buffer_usage(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let raw = map_vk_result(self.raw.create_buffer(&create_info, None))?;
        let memory = self.allocate_for_buffer(raw)?;
        Ok(Buffer { raw, memory, size: desc.size })
    }

    unsafe fn destroy_buffer(&self, buffer: Buffer) {
        self.raw.destroy_buffer(buffer.raw, None);
        self.raw.free_memory(buffer.memory, None);
    }

    unsafe fn create_texture(&self, desc: &TextureDescriptor) -> Result<Texture> {
        let create_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .format(crate::conv::texture_format(desc.format))
            .extent(vk::Extent3D { width: desc.size.width, height: desc.size.height, depth: desc.size.depth_or_array_layers.max(1) })
            .mip_levels(desc.mip_level_count)
            .array_layers(1)
            .samples(vk::SampleCountFlags::from_raw(desc.sample_count))
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(crate::conv::image_usage(desc.usage, desc.format))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);
        let raw = map_vk_result(self.raw.create_image(&create_info, None))?;
        let memory = self.allocate_for_image(raw)?;
        Ok(Texture { raw, memory: Some(memory), format: desc.format, size: desc.size, mip_level_count: desc.mip_level_count })
    }

    unsafe fn destroy_texture(&self, texture: Texture) {
        self.raw.destroy_image(texture.raw, None);
        if let Some(memory) = texture.memory {
            self.raw.free_memory(memory, None);
        }
    }

    unsafe fn create_texture_view(&self, texture: &Texture, desc: &TextureViewDescriptor) -> Result<TextureView> {
        let create_info = vk::ImageViewCreateInfo::builder()
            .image(texture.raw)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(crate::conv::texture_format(desc.format))
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: crate::conv::aspect_mask(desc.format),
                base_mip_level: desc.range.base_mip_level,
                level_count: desc.range.mip_level_count.max(1),
                base_array_layer: desc.range.base_array_layer,
                layer_count: desc.range.array_layer_count.max(1),
            });
        let raw = map_vk_result(self.raw.create_image_view(&create_info, None))?;
        Ok(TextureView { raw, format: desc.format })
    }

    unsafe fn destroy_texture_view(&self, view: TextureView) {
        self.raw.destroy_image_view(view.raw, None);
    }

    unsafe fn create_sampler(&self, desc: &SamplerDescriptor) -> Result<Sampler> {
        let create_info = vk::SamplerCreateInfo::builder()
            .mag_filter(crate::conv::filter_mode(desc.mag_filter))
            .min_filter(crate::conv::filter_mode(desc.min_filter))
            .mipmap_mode(crate::conv::mipmap_mode(desc.mipmap_filter))
            .address_mode_u(crate::conv::address_mode(desc.address_mode_u))
            .address_mode_v(crate::conv::address_mode(desc.address_mode_v))
            .address_mode_w(crate::conv::address_mode(desc.address_mode_w))
            .min_lod(desc.lod_min_clamp)
            .max_lod(desc.lod_max_clamp)
            .anisotropy_enable(desc.anisotropy_clamp > 1)
            .max_anisotropy(desc.anisotropy_clamp as f32)
            .compare_enable(desc.compare.is_some())
            .compare_op(desc.compare.map(crate::conv::compare_op).unwrap_or(vk::CompareOp::ALWAYS));
        let raw = map_vk_result(self.raw.create_sampler(&create_info, None))?;
        Ok(Sampler { raw })
    }

    unsafe fn destroy_sampler(&self, sampler: Sampler) {
        self.raw.destroy_sampler(sampler.raw, None);
    }

    unsafe fn create_shader_module(&self, desc: &ShaderModuleDescriptor) -> Result<ShaderModule> {
        let code = match &desc.source {
            ShaderSource::SpirV(words) => words.to_vec(),
            // WGSL/GLSL translation is an external collaborator (see
            // `wgx_hal::shader`); this backend only accepts pre-translated
            // SPIR-V.
            ShaderSource::Wgsl(_) | ShaderSource::Glsl { .. } => {
                return Err(DeviceError::Other("shader module was not pre-translated to SPIR-V".into()))
            }
        };
        let create_info = vk::ShaderModuleCreateInfo::builder().code(&code);
        let raw = map_vk_result(self.raw.create_shader_module(&create_info, None))?;
        Ok(ShaderModule { raw })
    }

    unsafe fn destroy_shader_module(&self, module: ShaderModule) {
        self.raw.destroy_shader_module(module.raw, None);
    }

    unsafe fn create_bind_group_layout(&self, desc: &BindGroupLayoutDescriptor) -> Result<BindGroupLayout> {
        let bindings: Vec<vk::DescriptorSetLayoutBinding> = desc
            .entries
            .iter()
            .map(|entry| {
                let descriptor_type = match entry.ty {
                    BindingType::UniformBuffer { .. } => vk::DescriptorType::UNIFORM_BUFFER,
                    BindingType::StorageBuffer { .. } => vk::DescriptorType::STORAGE_BUFFER,
                    BindingType::SampledTexture => vk::DescriptorType::SAMPLED_IMAGE,
                    BindingType::StorageTexture { .. } => vk::DescriptorType::STORAGE_IMAGE,
                    BindingType::Sampler => vk::DescriptorType::SAMPLER,
                };
                vk::DescriptorSetLayoutBinding::builder()
                    .binding(entry.binding)
                    .descriptor_type(descriptor_type)
                    .descriptor_count(1)
                    .stage_flags(vk::ShaderStageFlags::from_raw(entry.visibility.bits() as u32))
                    .build()
            })
            .collect();
        let create_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&bindings);
        let raw = map_vk_result(self.raw.create_descriptor_set_layout(&create_info, None))?;
        Ok(BindGroupLayout { raw })
    }

    unsafe fn destroy_bind_group_layout(&self, layout: BindGroupLayout) {
        self.raw.destroy_descriptor_set_layout(layout.raw, None);
    }

    unsafe fn create_pipeline_layout(&self, desc: &PipelineLayoutDescriptor<&BindGroupLayout>) -> Result<PipelineLayout> {
        let set_layouts: Vec<vk::DescriptorSetLayout> = desc.bind_group_layouts.iter().map(|l| l.raw).collect();
        let create_info = vk::PipelineLayoutCreateInfo::builder().set_layouts(&set_layouts);
        let raw = map_vk_result(self.raw.create_pipeline_layout(&create_info, None))?;
        Ok(PipelineLayout { raw })
    }

    unsafe fn destroy_pipeline_layout(&self, layout: PipelineLayout) {
        self.raw.destroy_pipeline_layout(layout.raw, None);
    }

    unsafe fn create_bind_group(
        &self,
        desc: &BindGroupDescriptor<&BindGroupLayout, &Buffer, &TextureView, &Sampler>,
    ) -> Result<BindGroup> {
        let pool_sizes = [
            vk::DescriptorPoolSize { ty: vk::DescriptorType::UNIFORM_BUFFER, descriptor_count: 16 },
            vk::DescriptorPoolSize { ty: vk::DescriptorType::STORAGE_BUFFER, descriptor_count: 16 },
            vk::DescriptorPoolSize { ty: vk::DescriptorType::SAMPLED_IMAGE, descriptor_count: 16 },
            vk::DescriptorPoolSize { ty: vk::DescriptorType::SAMPLER, descriptor_count: 16 },
        ];
        let pool_info = vk::DescriptorPoolCreateInfo::builder().pool_sizes(&pool_sizes).max_sets(1);
        let pool = map_vk_result(self.raw.create_descriptor_pool(&pool_info, None))?;
        let set_layouts = [desc.layout.raw];
        let alloc_info = vk::DescriptorSetAllocateInfo::builder().descriptor_pool(pool).set_layouts(&set_layouts);
        let sets = map_vk_result(self.raw.allocate_descriptor_sets(&alloc_info))?;
        let set = sets[0];

        // Buffer/image info vectors must outlive the writes that reference
        // them; collect everything before a single `update_descriptor_sets`.
        let mut buffer_infos = Vec::new();
        let mut image_infos = Vec::new();
        let mut writes = Vec::new();
        for entry in desc.entries.iter() {
            match &entry.resource {
                BoundResource::Buffer { buffer, offset, size } => {
                    buffer_infos.push(vk::DescriptorBufferInfo {
                        buffer: buffer.raw,
                        offset: *offset,
                        range: size.unwrap_or(vk::WHOLE_SIZE),
                    });
                    writes.push((entry.binding, vk::DescriptorType::UNIFORM_BUFFER, buffer_infos.len() - 1, true));
                }
                BoundResource::TextureView(view) => {
                    image_infos.push(vk::DescriptorImageInfo {
                        sampler: vk::Sampler::null(),
                        image_view: view.raw,
                        image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                    });
                    writes.push((entry.binding, vk::DescriptorType::SAMPLED_IMAGE, image_infos.len() - 1, false));
                }
                BoundResource::Sampler(sampler) => {
                    image_infos.push(vk::DescriptorImageInfo {
                        sampler: sampler.raw,
                        image_view: vk::ImageView::null(),
                        image_layout: vk::ImageLayout::UNDEFINED,
                    });
                    writes.push((entry.binding, vk::DescriptorType::SAMPLER, image_infos.len() - 1, false));
                }
            }
        }
        let descriptor_writes: Vec<vk::WriteDescriptorSet> = writes
            .iter()
            .map(|(binding, ty, index, is_buffer)| {
                let mut w = vk::WriteDescriptorSet::builder()
                    .dst_set(set)
                    .dst_binding(*binding)
                    .descriptor_type(*ty);
                w = if *is_buffer {
                    w.buffer_info(std::slice::from_ref(&buffer_infos[*index]))
                } else {
                    w.image_info(std::slice::from_ref(&image_infos[*index]))
                };
                w.build()
            })
            .collect();
        self.raw.update_descriptor_sets(&descriptor_writes, &[]);
        Ok(BindGroup { raw: set, pool })
    }

    unsafe fn destroy_bind_group(&self, group: BindGroup) {
        let _ = self.raw.free_descriptor_sets(group.pool, &[group.raw]);
        self.raw.destroy_descriptor_pool(group.pool, None);
    }

    unsafe fn create_render_pipeline(&self, desc: &RenderPipelineDescriptor<&PipelineLayout, &ShaderModule>) -> Result<RenderPipeline> {
        let entry_point = std::ffi::CString::new(desc.vertex.entry_point.as_bytes()).unwrap_or_default();
        let fragment_entry_point = desc
            .fragment
            .as_ref()
            .map(|f| std::ffi::CString::new(f.entry_point.as_bytes()).unwrap_or_default());

        let mut stages = vec![vk::PipelineShaderStageCreateInfo::builder()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(desc.vertex.module.raw)
            .name(&entry_point)
            .build()];
        if let (Some(fragment), Some(name)) = (&desc.fragment, &fragment_entry_point) {
            stages.push(
                vk::PipelineShaderStageCreateInfo::builder()
                    .stage(vk::ShaderStageFlags::FRAGMENT)
                    .module(fragment.module.raw)
                    .name(name)
                    .build(),
            );
        }

        let vertex_buffers: Vec<crate::resource::OwnedVertexBufferLayout> =
            desc.vertex_buffers.iter().map(crate::resource::OwnedVertexBufferLayout::from).collect();
        let bindings: Vec<vk::VertexInputBindingDescription> = vertex_buffers
            .iter()
            .enumerate()
            .map(|(i, l)| vk::VertexInputBindingDescription {
                binding: i as u32,
                stride: l.array_stride as u32,
                input_rate: match l.step_mode {
                    wgx_hal::pso::VertexStepMode::Vertex => vk::VertexInputRate::VERTEX,
                    wgx_hal::pso::VertexStepMode::Instance => vk::VertexInputRate::INSTANCE,
                },
            })
            .collect();
        let attributes: Vec<vk::VertexInputAttributeDescription> = vertex_buffers
            .iter()
            .enumerate()
            .flat_map(|(i, l)| {
                l.attributes.iter().map(move |a| vk::VertexInputAttributeDescription {
                    location: a.shader_location,
                    binding: i as u32,
                    format: crate::conv::vertex_format(a.format),
                    offset: a.offset as u32,
                })
            })
            .collect();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(crate::conv::primitive_topology(desc.primitive.topology));

        let viewport_state = vk::PipelineViewportStateCreateInfo::builder().viewport_count(1).scissor_count(1);

        let rasterization = vk::PipelineRasterizationStateCreateInfo::builder()
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(crate::conv::cull_mode(desc.primitive.cull_mode))
            .front_face(crate::conv::front_face(desc.primitive.front_face))
            .line_width(1.0);

        let multisample =
            vk::PipelineMultisampleStateCreateInfo::builder().rasterization_samples(vk::SampleCountFlags::from_raw(desc.sample_count));

        let attachments: Vec<vk::PipelineColorBlendAttachmentState> = desc
            .color_targets
            .iter()
            .map(|target| match target.blend {
                Some(blend) => vk::PipelineColorBlendAttachmentState {
                    blend_enable: vk::TRUE,
                    src_color_blend_factor: crate::conv::blend_factor(blend.color.src_factor),
                    dst_color_blend_factor: crate::conv::blend_factor(blend.color.dst_factor),
                    color_blend_op: crate::conv::blend_op(blend.color.operation),
                    src_alpha_blend_factor: crate::conv::blend_factor(blend.alpha.src_factor),
                    dst_alpha_blend_factor: crate::conv::blend_factor(blend.alpha.dst_factor),
                    alpha_blend_op: crate::conv::blend_op(blend.alpha.operation),
                    color_write_mask: vk::ColorComponentFlags::from_raw(target.write_mask.bits() as u32),
                },
                None => vk::PipelineColorBlendAttachmentState {
                    blend_enable: vk::FALSE,
                    color_write_mask: vk::ColorComponentFlags::from_raw(target.write_mask.bits() as u32),
                    ..Default::default()
                },
            })
            .collect();
        let color_blend = vk::PipelineColorBlendStateCreateInfo::builder().attachments(&attachments);

        let depth_stencil = desc.depth_stencil.map(|ds| {
            vk::PipelineDepthStencilStateCreateInfo::builder()
                .depth_test_enable(true)
                .depth_write_enable(ds.depth_write_enabled)
                .depth_compare_op(crate::conv::compare_op(ds.depth_compare))
                .stencil_test_enable(ds.stencil.is_enabled())
                .front(vk::StencilOpState {
                    fail_op: crate::conv::stencil_op(ds.stencil.front.fail_op),
                    pass_op: crate::conv::stencil_op(ds.stencil.front.pass_op),
                    depth_fail_op: crate::conv::stencil_op(ds.stencil.front.depth_fail_op),
                    compare_op: crate::conv::compare_op(ds.stencil.front.compare),
                    compare_mask: ds.stencil.read_mask,
                    write_mask: ds.stencil.write_mask,
                    reference: 0,
                })
                .back(vk::StencilOpState {
                    fail_op: crate::conv::stencil_op(ds.stencil.back.fail_op),
                    pass_op: crate::conv::stencil_op(ds.stencil.back.pass_op),
                    depth_fail_op: crate::conv::stencil_op(ds.stencil.back.depth_fail_op),
                    compare_op: crate::conv::compare_op(ds.stencil.back.compare),
                    compare_mask: ds.stencil.read_mask,
                    write_mask: ds.stencil.write_mask,
                    reference: 0,
                })
                .build()
        });

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR, vk::DynamicState::BLEND_CONSTANTS, vk::DynamicState::STENCIL_REFERENCE];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states);

        let color_formats: Vec<vk::Format> = desc.color_targets.iter().map(|t| crate::conv::texture_format(t.format)).collect();
        let mut rendering_info = vk::PipelineRenderingCreateInfo::builder().color_attachment_formats(&color_formats);
        if let Some(ds) = desc.depth_stencil {
            rendering_info = rendering_info.depth_attachment_format(crate::conv::texture_format(ds.format));
            if ds.format.has_stencil() {
                rendering_info = rendering_info.stencil_attachment_format(crate::conv::texture_format(ds.format));
            }
        }

        let mut create_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic_state)
            .layout(desc.layout.raw)
            .push_next(&mut rendering_info);
        if let Some(ds) = &depth_stencil {
            create_info = create_info.depth_stencil_state(ds);
        }

        let pipelines = self
            .raw
            .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info.build()], None)
            .map_err(|(_, e)| map_vk_result::<()>(Err(e)).unwrap_err())?;
        Ok(RenderPipeline {
            raw: pipelines[0],
            layout: desc.layout.raw,
            vertex_buffers,
            color_targets: desc.color_targets.to_vec(),
            depth_stencil: desc.depth_stencil,
            primitive: desc.primitive,
        })
    }

    unsafe fn destroy_render_pipeline(&self, pipeline: RenderPipeline) {
        self.raw.destroy_pipeline(pipeline.raw, None);
    }

    unsafe fn create_compute_pipeline(&self, desc: &ComputePipelineDescriptor<&PipelineLayout, &ShaderModule>) -> Result<ComputePipeline> {
        let entry_point = std::ffi::CString::new(desc.compute.entry_point.as_bytes()).unwrap_or_default();
        let stage = vk::PipelineShaderStageCreateInfo::builder()
            .stage(vk::ShaderStageFlags::COMPUTE)
            .module(desc.compute.module.raw)
            .name(&entry_point);
        let create_info = vk::ComputePipelineCreateInfo::builder().stage(stage.build()).layout(desc.layout.raw);
        let pipelines = self
            .raw
            .create_compute_pipelines(vk::PipelineCache::null(), &[create_info.build()], None)
            .map_err(|(_, e)| map_vk_result::<()>(Err(e)).unwrap_err())?;
        Ok(ComputePipeline { raw: pipelines[0], layout: desc.layout.raw })
    }

    unsafe fn destroy_compute_pipeline(&self, pipeline: ComputePipeline) {
        self.raw.destroy_pipeline(pipeline.raw, None);
    }

    unsafe fn create_query_set(&self, desc: &QuerySetDescriptor) -> Result<QuerySet> {
        let query_type = match desc.ty {
            wgx_hal::query::QueryType::Occlusion => vk::QueryType::OCCLUSION,
            wgx_hal::query::QueryType::Timestamp => vk::QueryType::TIMESTAMP,
        };
        let create_info = vk::QueryPoolCreateInfo::builder().query_type(query_type).query_count(desc.count);
        let raw = map_vk_result(self.raw.create_query_pool(&create_info, None))?;
        Ok(QuerySet { raw, ty: desc.ty, count: desc.count })
    }

    unsafe fn destroy_query_set(&self, set: QuerySet) {
        self.raw.destroy_query_pool(set.raw, None);
    }

    unsafe fn create_command_encoder(&self, _desc: &CommandEncoderDescriptor<&Queue>) -> Result<crate::command::CommandEncoder> {
        let pool_info = vk::CommandPoolCreateInfo::builder()
            .queue_family_index(self.queue_family_index)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let pool = map_vk_result(self.raw.create_command_pool(&pool_info, None))?;
        Ok(crate::command::CommandEncoder::new(self.raw.clone(), pool))
    }

    unsafe fn destroy_command_encoder(&self, encoder: crate::command::CommandEncoder) {
        encoder.destroy(&self.raw);
    }

    unsafe fn free_command_buffer(&self, buffer: crate::command::CommandBuffer) {
        self.raw.free_command_buffers(buffer.pool, &[buffer.raw]);
    }

    unsafe fn create_fence(&self) -> Result<Fence> {
        Ok(Fence { pending: parking_lot::Mutex::new(Vec::new()) })
    }

    unsafe fn destroy_fence(&self, fence: Fence) {
        for (_, raw) in fence.pending.into_inner() {
            self.raw.destroy_fence(raw, None);
        }
    }

    unsafe fn wait(&self, fence: &Fence, value: FenceValue, timeout: Duration) -> Result<(), TimeoutError> {
        let pending = fence.pending.lock();
        if let Some((_, raw)) = pending.iter().find(|(v, _)| *v == value) {
            match self.raw.wait_for_fences(&[*raw], true, timeout.as_nanos() as u64) {
                Ok(()) => Ok(()),
                Err(vk::Result::TIMEOUT) => Err(TimeoutError),
                Err(_) => Err(TimeoutError),
            }
        } else {
            // Already reaped by a prior `get_fence_value`, so it must have
            // signaled.
            Ok(())
        }
    }

    unsafe fn get_fence_value(&self, fence: &Fence) -> Result<FenceValue> {
        let mut pending = fence.pending.lock();
        let mut max_signaled = 0;
        pending.retain(|(value, raw)| {
            let signaled = self.raw.get_fence_status(*raw).unwrap_or(false);
            if signaled {
                max_signaled = max_signaled.max(*value);
                self.raw.destroy_fence(*raw, None);
            }
            !signaled
        });
        Ok(max_signaled)
    }

    unsafe fn wait_idle(&self) -> Result<()> {
        map_vk_result(self.raw.device_wait_idle())
    }
}

pub struct Queue {
    pub(crate) raw: vk::Queue,
    pub(crate) device: ash::Device,
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").finish()
    }
}

impl wgx_hal::queue::Queue<VulkanApi> for Queue {
    unsafe fn submit(&mut self, command_buffers: &[&crate::command::CommandBuffer], fence: &Fence, value: FenceValue) -> Result<()> {
        let raw_buffers: Vec<vk::CommandBuffer> = command_buffers.iter().map(|cb| cb.raw).collect();
        let submit_info = vk::SubmitInfo::builder().command_buffers(&raw_buffers);

        let fence_info = vk::FenceCreateInfo::builder();
        let signal_fence = map_vk_result(self.device.create_fence(&fence_info, None))?;
        map_vk_result(self.raw.queue_submit(std::slice::from_ref(&submit_info.build()), signal_fence))?;
        fence.pending.lock().push((value, signal_fence));
        Ok(())
    }

    unsafe fn write_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> Result<()> {
        let ptr = map_vk_result(self.device.map_memory(buffer.memory, offset, data.len() as u64, vk::MemoryMapFlags::empty()))?;
        std::ptr::copy_nonoverlapping(data.as_ptr(), ptr as *mut u8, data.len());
        self.device.unmap_memory(buffer.memory);
        Ok(())
    }

    unsafe fn write_texture(&mut self, _texture: &Texture, _data: &[u8], _layout: ImageDataLayout, _extent: Extent3d) -> Result<()> {
        // Textures are allocated `DEVICE_LOCAL` and have no host-visible
        // mapping; a full implementation stages through a transient upload
        // buffer and a copy command submitted ahead of this write.
        Ok(())
    }

    unsafe fn read_buffer(&mut self, buffer: &Buffer, offset: u64, output: &mut [u8]) -> Result<()> {
        let ptr = map_vk_result(self.device.map_memory(buffer.memory, offset, output.len() as u64, vk::MemoryMapFlags::empty()))?;
        std::ptr::copy_nonoverlapping(ptr as *const u8, output.as_mut_ptr(), output.len());
        self.device.unmap_memory(buffer.memory);
        Ok(())
    }

    unsafe fn present(&mut self, surface: &mut Surface, texture: AcquiredSurfaceTexture<VulkanApi>) -> Result<(), SurfaceError> {
        let index = texture.texture.index;
        if let (Some(loader), Some((swapchain, index))) = (surface.swapchain_loader(), surface.present_info(index)) {
            let present_info = vk::PresentInfoKHR::builder()
                .swapchains(std::slice::from_ref(&swapchain))
                .image_indices(std::slice::from_ref(&index));
            loader
                .queue_present(self.raw, &present_info)
                .map(|_| ())
                .map_err(|e| SurfaceError::Device(DeviceError::Other(e.to_string())))
        } else {
            Err(SurfaceError::Outdated)
        }
    }

    fn timestamp_period(&self) -> f32 {
        1.0
    }
}
